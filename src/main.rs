/* 3rd party libraries */
use clap::Arg;
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::io::BufRead;
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use liftbank::config;
use liftbank::coordinator::{Command, Coordinator};
use liftbank::shared::{BankSnapshot, Phase};
use liftbank::shell::{Action, Shell, HELP};
use liftbank::unwrap_or_exit;

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = clap::Command::new("liftbank")
        .about("Simulates a bank of lift cars answering hall calls")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the TOML configuration"),
        )
        .get_matches();

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let config = unwrap_or_exit!(
        config::load_config(config_path),
        "Failed to load configuration"
    );

    // Initialize channels
    let (command_tx, command_rx) = cbc::unbounded::<Command>();
    let (snapshot_tx, snapshot_rx) = cbc::unbounded::<BankSnapshot>();
    let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
    let (line_tx, line_rx) = cbc::unbounded::<String>();

    // Start the coordinator
    let coordinator = Coordinator::new(&config, command_rx, snapshot_tx, terminate_rx);
    let coordinator_thread = unwrap_or_exit!(
        Builder::new()
            .name("coordinator".into())
            .spawn(move || coordinator.run()),
        "Failed to start coordinator"
    );

    // Start the input reader
    unwrap_or_exit!(
        Builder::new().name("stdin".into()).spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        }),
        "Failed to start input reader"
    );

    info!("Type `help` for commands");
    let mut shell = Shell::new(config.building.floor_count, config.building.car_count);
    let mut line_rx = line_rx;
    let mut input_closed = false;
    let mut latest: Option<BankSnapshot> = None;

    // Main loop
    loop {
        let mut input_ended = false;
        let mut quit = false;

        cbc::select! {
            recv(snapshot_rx) -> snapshot => {
                match snapshot {
                    Ok(snapshot) => {
                        print_snapshot(&snapshot);
                        latest = Some(snapshot);
                    }
                    Err(_) => quit = true,
                }
            },

            recv(line_rx) -> line => {
                match line {
                    Ok(line) => match shell.interpret(&line) {
                        Ok(Action::Send(command)) => {
                            quit = command_tx.send(command).is_err();
                        }
                        Ok(Action::Status) => {
                            if let Some(snapshot) = fetch_snapshot(&command_tx) {
                                print_snapshot(&snapshot);
                            }
                        }
                        Ok(Action::Help) => println!("{}", HELP),
                        Ok(Action::Quit) => quit = true,
                        Ok(Action::Nothing) => {}
                        Err(e) => warn!("{}", e),
                    },
                    Err(_) => input_ended = true,
                }
            },
        }

        if quit {
            break;
        }

        if input_ended {
            // Let the bank finish the work already handed to it
            input_closed = true;
            line_rx = cbc::never();
            latest = fetch_snapshot(&command_tx).or(latest);
        }

        if input_closed && latest.as_ref().map_or(true, is_settled) {
            break;
        }
    }

    // Cleanup
    let _ = terminate_tx.send(());
    if coordinator_thread.join().is_err() {
        error!("Coordinator thread panicked");
    }
}

// Commands are handled in order, so the reply reflects everything sent before it.
fn fetch_snapshot(command_tx: &cbc::Sender<Command>) -> Option<BankSnapshot> {
    let (reply_tx, reply_rx) = cbc::bounded::<BankSnapshot>(1);
    command_tx.send(Command::Snapshot(reply_tx)).ok()?;
    match reply_rx.recv_timeout(Duration::from_secs(1)) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("No snapshot from coordinator: {}", e);
            None
        }
    }
}

fn print_snapshot(snapshot: &BankSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("Failed to serialize snapshot: {}", e),
    }
}

// Nothing left to animate. A bank without cars never drains its queue.
fn is_settled(snapshot: &BankSnapshot) -> bool {
    let idle = snapshot.cars.iter().all(|car| car.phase == Phase::Idle);
    idle && (snapshot.queue_length == 0 || snapshot.cars.is_empty())
}
