use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use client_core::{ConfirmationGate, EnrollmentClient, Renderer, StatusSurface};
use shared::domain::{Roster, StatusKind, StatusMessage};
use tracing::warn;
use url::Url;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: Url,
}

struct TerminalView;

impl Renderer for TerminalView {
    fn render(&self, roster: &Roster) {
        println!();
        for (name, record) in roster {
            println!("== {name} ==");
            println!("{}", record.description);
            println!("Schedule: {}", record.schedule);
            println!("Availability: {} spots remaining", record.spots_left());
            println!("Enrolled Students:");
            if record.participants.is_empty() {
                println!("  No participants yet. Be the first to enroll.");
            } else {
                for email in &record.participants {
                    println!("  {email}  (remove: unregister {email} {name})");
                }
            }
            println!();
        }
        let options: Vec<&str> = roster.keys().map(String::as_str).collect();
        println!("Activities: {}", options.join(", "));
    }

    fn render_unavailable(&self) {
        println!("Failed to load activities. Please try again later.");
    }

    fn reset_signup_form(&self) {
        // Terminal input is not a persistent form; nothing to clear.
    }
}

impl StatusSurface for TerminalView {
    fn show(&self, message: &StatusMessage) {
        match message.kind {
            StatusKind::Success => println!("[ok] {}", message.text),
            StatusKind::Error => println!("[error] {}", message.text),
        }
    }

    fn clear(&self) {}
}

struct TerminalPrompt;

impl ConfirmationGate for TerminalPrompt {
    fn confirm_unregister(&self, activity: &str, email: &str) -> bool {
        print!("Are you sure you want to unregister {email} from {activity}? [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let view = Arc::new(TerminalView);
    let client = EnrollmentClient::new(
        args.server_url.as_str(),
        view.clone(),
        view,
        Arc::new(TerminalPrompt),
    );

    if client.refresh_roster().await.is_err() {
        warn!("initial roster fetch failed; retry with `refresh`");
    }

    println!("commands: refresh | signup <email> <activity> | unregister <email> <activity> | quit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "refresh" => {
                let _ = client.refresh_roster().await;
            }
            "signup" | "unregister" => match rest.split_once(' ') {
                Some((email, activity)) if !activity.trim().is_empty() => {
                    let activity = activity.trim();
                    if command == "signup" {
                        client.sign_up(activity, email).await;
                    } else {
                        client.unregister(activity, email).await;
                    }
                }
                _ => println!("usage: {command} <email> <activity name>"),
            },
            "quit" | "exit" => break,
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}
