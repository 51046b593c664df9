use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_night::config::AppConfig;
use trivia_night::game::{GameController, GameError, GroupSetup};
use trivia_night::protocol::{AnswerOutcome, JokerOutcome};
use trivia_night::questions::JsonDirPool;
use trivia_night::store::FileStore;
use trivia_night::types::{Category, GameState, Language, Phase, Question};

const HELP: &str = "\
Commands:
  start Alpha:Ann,Bob Beta:Cem   start a game (1-3 groups)
  spin                           spin the category wheel
  pick <category>                pick a category directly
  answer <key>                   answer a multiple choice question
  reveal                         show the correct answer
  right | wrong                  judge the revealed answer
  joker                          swap the question for another one
  skip                           drop the question and pick again
  pass                           give the turn to the next group
  lang <tr|en>                   switch question language
  status                         show the scoreboard
  end                            end the game
  quit                           leave";

#[derive(Debug, PartialEq)]
enum Command {
    Start(Vec<GroupSetup>),
    Spin,
    Pick(Category),
    Answer(String),
    Reveal,
    Judge(bool),
    Joker,
    Skip,
    Pass,
    Language(Language),
    Status,
    End,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Help);
    };
    let rest: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "start" => Command::Start(parse_groups(&rest)?),
        "spin" => Command::Spin,
        "pick" => {
            let name = rest.first().ok_or("usage: pick <category>")?;
            Command::Pick(name.parse().map_err(|e| format!("{}", e))?)
        }
        "answer" => {
            let key = rest.first().ok_or("usage: answer <key>")?;
            Command::Answer(key.to_string())
        }
        "reveal" => Command::Reveal,
        "right" => Command::Judge(true),
        "wrong" => Command::Judge(false),
        "joker" => Command::Joker,
        "skip" => Command::Skip,
        "pass" => Command::Pass,
        "lang" => {
            let code = rest.first().ok_or("usage: lang <tr|en>")?;
            Command::Language(code.parse().map_err(|e| format!("{}", e))?)
        }
        "status" => Command::Status,
        "end" => Command::End,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(command)
}

/// `Alpha:Ann,Bob Beta:Cem` into group setups
fn parse_groups(args: &[&str]) -> Result<Vec<GroupSetup>, String> {
    args.iter()
        .map(|arg| {
            let (name, players) = arg
                .split_once(':')
                .ok_or_else(|| format!("expected Group:Player,Player, got '{}'", arg))?;
            let players: Vec<&str> = players.split(',').filter(|p| !p.is_empty()).collect();
            Ok(GroupSetup::new(name, players))
        })
        .collect()
}

fn print_question(question: &Question, show_options: bool) {
    println!("[{}] {}", question.category, question.text);
    if show_options && question.has_options() {
        for (key, text) in question.options.iter().flatten() {
            println!("  {}) {}", key, text);
        }
    }
}

fn print_outcome(outcome: &AnswerOutcome) {
    if outcome.correct {
        println!("Correct!");
    } else {
        println!("Wrong, the answer was {}", outcome.correct_answer_key);
    }
    if let Some(ref winner) = outcome.winner {
        println!("{} collected every badge and wins the game!", winner.name);
    }
}

fn print_status(state: &GameState) {
    match state.phase() {
        Phase::NotStarted => println!("No game running"),
        Phase::Won => println!("Game won"),
        Phase::AwaitingCategory | Phase::AwaitingAnswer => {}
    }

    for (i, group) in state.groups.iter().enumerate() {
        let marker = if i == state.current_group_index && state.is_game_started {
            ">"
        } else {
            " "
        };
        let badges: Vec<&str> = group.badges.iter().map(|c| c.as_str()).collect();
        println!(
            "{} {} ({} right, {} wrong, {} jokers) badges: [{}]",
            marker,
            group.name,
            group.correct_answers,
            group.wrong_answers,
            group.jokers,
            badges.join(", ")
        );
    }

    if let Some(group) = state.current_group().filter(|_| state.is_game_started) {
        let missing: Vec<&str> = group.missing_badges().iter().map(|c| c.as_str()).collect();
        println!("{} still needs: {}", group.name, missing.join(", "));
    }
    if let Some(ref question) = state.current_question {
        println!("Question open, {}s left: {}", state.time_remaining, question.text);
    } else if let Some(category) = state.selected_category {
        println!("Category {} picked, no question yet", category);
    }
}

/// Announce the end of the countdown as states arrive
fn spawn_countdown_renderer(mut updates: broadcast::Receiver<GameState>) {
    tokio::spawn(async move {
        let mut previous = None;
        loop {
            match updates.recv().await {
                Ok(state) => {
                    let remaining = state.current_question.as_ref().map(|_| state.time_remaining);
                    if remaining == Some(0) && previous != Some(0) {
                        println!("Time is up! Reveal the answer and judge it.");
                    }
                    previous = remaining;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Renderer skipped {} states", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn run_command(controller: &GameController, command: Command) -> Result<(), GameError> {
    let show_options = controller.settings().show_options;

    match command {
        Command::Start(setups) => {
            let state = controller.start_game(setups).await?;
            print_status(&state);
        }
        Command::Spin => {
            let spin = controller.spin_wheel().await?;
            println!("The wheel lands on {}", spin.result);
            let question = controller.select_category(spin.result).await?;
            print_question(&question, show_options);
        }
        Command::Pick(category) => {
            let question = controller.select_category(category).await?;
            print_question(&question, show_options);
        }
        Command::Answer(key) => print_outcome(&controller.answer(&key).await?),
        Command::Reveal => {
            let question = controller.reveal_answer().await?;
            let answer = question
                .options
                .as_ref()
                .and_then(|options| options.get(&question.correct_answer_key))
                .unwrap_or(&question.correct_answer_key);
            println!("Answer: {}", answer);
        }
        Command::Judge(correct) => print_outcome(&controller.judge(correct).await?),
        Command::Joker => match controller.use_joker().await? {
            JokerOutcome::Replaced { question } => print_question(&question, show_options),
            JokerOutcome::NoReplacement => println!("No other question left, the joker is spent"),
        },
        Command::Skip => print_status(&controller.reset_question().await?),
        Command::Pass => print_status(&controller.pass_turn().await?),
        Command::Language(language) => {
            controller.set_language(language).await;
            println!("Questions will be asked in {}", language);
        }
        Command::Status => print_status(&controller.state().await),
        Command::End => print_status(&controller.end_game().await),
        Command::Help | Command::Quit => println!("{}", HELP),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivia_night=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env();
    let pool = Arc::new(JsonDirPool::new(config.questions_dir.clone()));
    let store = Arc::new(FileStore::new(config.state_file.clone()));
    tracing::info!(
        "Questions from {}, state in {}",
        pool.root().display(),
        store.path().display()
    );

    let controller = GameController::new(config, pool, store);
    spawn_countdown_renderer(controller.subscribe());
    let state = controller.restore().await;
    if state.is_game_started {
        println!("Resuming saved game");
        print_status(&state);
        match controller.resume_pending_category().await {
            Ok(Some(question)) => print_question(&question, controller.settings().show_options),
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
    } else {
        println!("{}", HELP);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read from stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(e) = run_command(&controller, command).await {
                    println!("{}", e);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    controller.flush().await;
}
