use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::time::Duration;

use clap::Subcommand;
use studyroom_core::{Difficulty, Event, TimerMode};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::{open_controller, print_json, save_engine, Controller};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Print current timer state as JSON
    Status,
    /// Restore the current mode's full duration
    Reset,
    /// Finish the current interval now
    Skip,
    /// Switch mode (pomodoro, short, long)
    Mode { mode: TimerMode },
    /// Add minutes to the countdown (negative to remove)
    Add {
        #[arg(allow_hyphen_values = true)]
        minutes: i64,
    },
    /// Rate the session that just finished (easy, medium, hard)
    Rate { difficulty: Difficulty },
    /// Close the feedback prompt without rating
    Dismiss,
    /// Run the timer in the foreground, one tick per second
    Run,
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        print_json(event)?;
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_controller()?;

    // Apply whatever time passed since the last invocation first.
    let mut events = controller.sync()?;

    match action {
        TimerAction::Start => events.extend(controller.start()?),
        TimerAction::Pause => events.extend(controller.pause()?),
        TimerAction::Toggle => events.extend(controller.toggle()?),
        TimerAction::Status => events.push(controller.snapshot()),
        TimerAction::Reset => events.extend(controller.reset()?),
        TimerAction::Skip => events.extend(controller.skip()?),
        TimerAction::Mode { mode } => events.extend(controller.set_mode(mode)?),
        TimerAction::Add { minutes } => events.extend(controller.add_time(minutes)?),
        TimerAction::Rate { difficulty } => events.extend(controller.rate(difficulty)?),
        TimerAction::Dismiss => events.extend(controller.dismiss_feedback()?),
        TimerAction::Run => {
            print_events(&events)?;
            save_engine(&controller)?;
            return run_foreground(controller);
        }
    }

    print_events(&events)?;
    save_engine(&controller)?;
    Ok(())
}

fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// What became of a rating prompt.
enum Prompt {
    Rated(Difficulty),
    Skipped,
    Interrupted,
}

/// Ask for a rating on stdin. Empty input or end of input skips; ctrl-c
/// leaves the rating owed.
async fn prompt_difficulty<R, F>(
    input: &mut Lines<R>,
    mut interrupt: Pin<&mut F>,
) -> Result<Prompt, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    loop {
        eprint!("\nHow did it go? [e]asy / [m]edium / [h]ard (enter to skip): ");
        std::io::stderr().flush()?;
        let line = tokio::select! {
            line = input.next_line() => line?,
            _ = interrupt.as_mut() => return Ok(Prompt::Interrupted),
        };
        let Some(line) = line else {
            return Ok(Prompt::Skipped);
        };
        if line.trim().is_empty() {
            return Ok(Prompt::Skipped);
        }
        match line.parse::<Difficulty>() {
            Ok(d) => return Ok(Prompt::Rated(d)),
            Err(e) => eprintln!("{e}"),
        }
    }
}

/// Resolve the feedback gate from the prompt. Returns false when interrupted.
async fn resolve_feedback<R, F>(
    controller: &mut Controller,
    input: &mut Lines<R>,
    interrupt: Pin<&mut F>,
) -> Result<bool, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    let events = match prompt_difficulty(input, interrupt).await? {
        Prompt::Rated(difficulty) => controller.rate(difficulty)?,
        Prompt::Skipped => controller.dismiss_feedback()?,
        Prompt::Interrupted => {
            eprintln!("\nrating left open; run `studyroom timer rate` later");
            return Ok(false);
        }
    };
    for event in &events {
        if let Event::FeedbackApplied {
            interval_days: Some(days),
            next_review_date: Some(next),
            ..
        } = event
        {
            eprintln!("Next review in {days} day(s), on {next}.");
        }
        if let Event::ModeChanged { mode, .. } = event {
            eprintln!("{mode} begins.");
        }
    }
    Ok(true)
}

fn run_foreground(mut controller: Controller) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;

    let result = runtime.block_on(async {
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        if controller.timer().is_awaiting_feedback()
            && !resolve_feedback(&mut controller, &mut input, ctrl_c.as_mut()).await?
        {
            save_engine(&controller)?;
            return Ok(());
        }
        if !controller.timer().is_running() {
            controller.start()?;
        }

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        'run: loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = ctrl_c.as_mut() => {
                    controller.pause()?;
                    eprintln!("\npaused");
                    break;
                }
            }

            let events = controller.sync()?;
            let timer = controller.timer();
            eprint!(
                "\r{:<12} {} {:>3.0}%  (cycle {})   ",
                timer.mode().label(),
                format_remaining(timer.seconds_remaining()),
                timer.progress() * 100.0,
                timer.cycle_count()
            );

            for event in &events {
                match event {
                    Event::FocusCompleted { cycle_count, .. } => {
                        eprintln!("\nFocus session {cycle_count} complete.");
                        save_engine(&controller)?;
                        if !resolve_feedback(&mut controller, &mut input, ctrl_c.as_mut()).await? {
                            break 'run;
                        }
                    }
                    Event::BreakCompleted { finished, .. } => {
                        eprintln!("\n{finished} over.");
                    }
                    _ => {}
                }
            }
            save_engine(&controller)?;

            if !controller.timer().is_running() {
                eprintln!("\ntimer stopped; run again to continue");
                break;
            }
        }
        save_engine(&controller)?;
        Ok::<(), Box<dyn std::error::Error>>(())
    });
    // A pending stdin read must not hold up exit.
    runtime.shutdown_background();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prompt_retries_until_valid_rating() {
        let mut input = BufReader::new(&b"maybe\nm\n"[..]).lines();
        let never = std::future::pending::<std::io::Result<()>>();
        tokio::pin!(never);
        let prompt = prompt_difficulty(&mut input, never.as_mut()).await.unwrap();
        assert!(matches!(prompt, Prompt::Rated(Difficulty::Medium)));
    }

    #[tokio::test]
    async fn prompt_skips_on_blank_line_or_eof() {
        let never = std::future::pending::<std::io::Result<()>>();
        tokio::pin!(never);
        let mut blank = BufReader::new(&b"\n"[..]).lines();
        assert!(matches!(
            prompt_difficulty(&mut blank, never.as_mut()).await.unwrap(),
            Prompt::Skipped
        ));
        let mut eof = BufReader::new(&b""[..]).lines();
        assert!(matches!(
            prompt_difficulty(&mut eof, never.as_mut()).await.unwrap(),
            Prompt::Skipped
        ));
    }

    #[tokio::test]
    async fn interrupt_ends_a_waiting_prompt() {
        // The writer half stays open, so the read never completes.
        let (_writer, reader) = tokio::io::duplex(64);
        let mut input = BufReader::new(reader).lines();
        let interrupt = std::future::ready(Ok::<(), std::io::Error>(()));
        tokio::pin!(interrupt);
        let prompt = prompt_difficulty(&mut input, interrupt.as_mut()).await.unwrap();
        assert!(matches!(prompt, Prompt::Interrupted));
    }

    #[test]
    fn remaining_is_minutes_and_seconds() {
        assert_eq!(format_remaining(25 * 60), "25:00");
        assert_eq!(format_remaining(61), "01:01");
        assert_eq!(format_remaining(0), "00:00");
    }
}
