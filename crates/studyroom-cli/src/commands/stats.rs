use clap::{Subcommand, ValueEnum};
use studyroom_core::stats::{self, Counters};
use studyroom_core::ActivityRange;

use super::{open_controller, print_json};

#[derive(Clone, Copy, ValueEnum)]
pub enum RangeArg {
    Week,
    Month,
}

impl From<RangeArg> for ActivityRange {
    fn from(range: RangeArg) -> Self {
        match range {
            RangeArg::Week => ActivityRange::Week,
            RangeArg::Month => ActivityRange::Month,
        }
    }
}

#[derive(Subcommand)]
pub enum StatsAction {
    /// Dashboard: due list, goal, streak, subjects and achievements
    Overview,
    /// Today's progress toward the daily goal
    Today,
    /// Consecutive active days ending today
    Streak,
    /// Per-subject statistics
    Subjects,
    /// Daily activity counts, oldest first
    Activity {
        #[arg(long, value_enum, default_value = "week")]
        range: RangeArg,
    },
    /// Achievement progress
    Achievements,
    /// Recent sessions, newest first
    Log {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let controller = open_controller()?;

    match action {
        StatsAction::Overview => print_json(&controller.overview())?,
        StatsAction::Today => print_json(&controller.today_progress())?,
        StatsAction::Streak => println!("{}", controller.streak()),
        StatsAction::Subjects => print_json(&controller.subject_stats())?,
        StatsAction::Activity { range } => print_json(&controller.activity(range.into()))?,
        StatsAction::Achievements => {
            let counters = Counters::collect(controller.state(), controller.today());
            print_json(&stats::achievements(&counters))?;
        }
        StatsAction::Log { limit } => {
            print_json(&stats::recent_log(controller.state(), limit))?;
        }
    }
    Ok(())
}
