use chrono::NaiveDate;
use habit_streaks::config::LOG_FILTER_ENV;
use habit_streaks::{
    Activity, ActivityStatus, Habit, HabitId, Schedule, StreakSummary, Tracker,
    load_tracker_from_csv, load_tracker_from_json, save_tracker_to_csv, save_tracker_to_json,
};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  list                                   List habits\n  statuses                               List activity statuses\n  habit <id> <days|interval> <rule> <task...>\n                                         Add a habit (rule like 1010100 or 3)\n  remove <id>                            Remove a habit\n  log <id> <YYYY-MM-DD> [status] [note...]\n                                         Log an activity\n  unlog <id> <YYYY-MM-DD>                Remove a logged activity\n  pause <id> | resume <id>               Deactivate / activate a habit\n  streaks <id> [YYYY-MM-DD]              Show streaks as of a date (default today)\n  next <id> [YYYY-MM-DD]                 Show the next required day\n  rating <id> [YYYY-MM-DD]               Show the habit rating\n  ratings [YYYY-MM-DD]                   Show ratings for every habit\n  save <json|csv> <path>                 Persist habits to disk\n  load <json|csv> <path>                 Load habits from disk\n  quit|exit                              Exit"
    );
}

fn print_statuses() {
    println!("Activity statuses:");
    for (key, description) in ActivityStatus::variants() {
        println!("  {:<12} {}", key, description);
    }
}

fn print_habits(tracker: &Tracker) {
    if tracker.is_empty() {
        println!("No habits yet.");
        return;
    }
    for habit in tracker.habits() {
        let state = if habit.active { "active" } else { "paused" };
        println!(
            "  {:>3}  {:<24} {:<20} {:<7} logged={}",
            habit.id,
            habit.task,
            habit.schedule.to_string(),
            state,
            habit.activities().len()
        );
    }
}

fn parse_id(input: Option<&str>) -> Result<HabitId, String> {
    input
        .ok_or_else(|| "missing habit id".to_string())?
        .parse::<HabitId>()
        .map_err(|_| "Invalid id".to_string())
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| "Invalid date (YYYY-MM-DD)".into())
}

/// Optional trailing date argument; the local calendar date when absent.
fn parse_today(input: Option<&str>) -> Result<NaiveDate, String> {
    match input {
        Some(value) => parse_date(value),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn main() {
    let filter = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();

    let mut tracker = Tracker::new();

    println!("Habit Tracker (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "list" => print_habits(&tracker),
            "statuses" => print_statuses(),
            "habit" => {
                let id = match parse_id(parts.next()) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let (Some(kind), Some(rule)) = (parts.next(), parts.next()) else {
                    println!("Usage: habit <id> <days|interval> <rule> <task...>");
                    continue;
                };
                let task = parts.collect::<Vec<_>>().join(" ");
                if task.is_empty() {
                    println!("Usage: habit <id> <days|interval> <rule> <task...>");
                    continue;
                }
                let schedule = match Schedule::parse(kind, rule) {
                    Ok(schedule) => schedule,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let habit = Habit::new(id, task, schedule, chrono::Local::now().date_naive());
                let summary = format!("{} ({})", habit.task, habit.schedule);
                match tracker.add_habit(habit) {
                    Ok(()) => println!("Habit {id} added: {summary}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "remove" => match parse_id(parts.next()) {
                Ok(id) => match tracker.remove_habit(id) {
                    Some(_) => println!("Removed habit {id}."),
                    None => println!("Habit {id} not found."),
                },
                Err(e) => println!("{e}"),
            },
            "log" => {
                let id = match parse_id(parts.next()) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let date = match parts.next().map(parse_date) {
                    Some(Ok(date)) => date,
                    Some(Err(e)) => {
                        println!("{e}");
                        continue;
                    }
                    None => {
                        println!("Usage: log <id> <YYYY-MM-DD> [status] [note...]");
                        continue;
                    }
                };
                let status = match parts.next().map(str::parse::<ActivityStatus>) {
                    Some(Ok(status)) => status,
                    Some(Err(e)) => {
                        println!("Error: {e}");
                        continue;
                    }
                    None => ActivityStatus::default(),
                };
                let note = parts.collect::<Vec<_>>().join(" ");
                let activity = Activity::with_status(date, status).with_note(note);
                match tracker.log_activity(id, activity) {
                    Ok(()) => println!("Logged {date} ({status}) for habit {id}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "unlog" => {
                let id = match parse_id(parts.next()) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let Some(Ok(date)) = parts.next().map(parse_date) else {
                    println!("Usage: unlog <id> <YYYY-MM-DD>");
                    continue;
                };
                match tracker.remove_activity(id, date) {
                    Ok(Some(_)) => println!("Removed {date} from habit {id}."),
                    Ok(None) => println!("Nothing logged on {date} for habit {id}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "pause" | "resume" => match parse_id(parts.next()) {
                Ok(id) => match tracker.set_active(id, cmd == "resume") {
                    Ok(()) => println!("Habit {id} {cmd}d."),
                    Err(e) => println!("Error: {e}"),
                },
                Err(e) => println!("{e}"),
            },
            "streaks" | "next" | "rating" => {
                let id = match parse_id(parts.next()) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let today = match parse_today(parts.next()) {
                    Ok(today) => today,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match cmd {
                    "streaks" => match tracker.streaks(id, today) {
                        Ok(streaks) => {
                            println!("Streaks for habit {id} as of {today}:");
                            for summary in StreakSummary::from_streaks(streaks, today) {
                                println!("  {}", summary.to_cli_line());
                            }
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    "next" => match tracker.habit(id).map(|h| h.next_required_day(today)) {
                        Some(Ok(date)) => println!("Next required day for habit {id}: {date}"),
                        Some(Err(e)) => println!("Error: {e}"),
                        None => println!("Habit {id} not found."),
                    },
                    _ => match tracker.rating(id, today) {
                        Ok(tier) => println!("Habit {id} rating as of {today}: {tier}"),
                        Err(e) => println!("Error: {e}"),
                    },
                }
            }
            "ratings" => {
                let today = match parse_today(parts.next()) {
                    Ok(today) => today,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match tracker.ratings(today) {
                    Ok(ratings) => {
                        for rating in ratings {
                            println!("  {:>3}  {:<24} {}", rating.habit_id, rating.task, rating.tier);
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "save" | "load" => {
                let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: {cmd} <json|csv> <path>");
                    continue;
                };
                match (cmd, format) {
                    ("save", "json") => match save_tracker_to_json(&tracker, path) {
                        Ok(()) => println!("Tracker saved to {path}"),
                        Err(e) => println!("Save error: {e}"),
                    },
                    ("save", "csv") => match save_tracker_to_csv(&tracker, path) {
                        Ok(()) => println!("Tracker saved to {path}"),
                        Err(e) => println!("Save error: {e}"),
                    },
                    ("load", "json") => match load_tracker_from_json(path) {
                        Ok(loaded) => {
                            tracker = loaded;
                            println!("Tracker loaded from {path}");
                        }
                        Err(e) => println!("Load error: {e}"),
                    },
                    ("load", "csv") => match load_tracker_from_csv(path) {
                        Ok(loaded) => {
                            tracker = loaded;
                            println!("Tracker loaded from {path}");
                        }
                        Err(e) => println!("Load error: {e}"),
                    },
                    _ => println!("Unknown format '{format}' (expected json or csv)"),
                }
            }
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
}
