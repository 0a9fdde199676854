//! Example demonstrating the scheduling strategies end to end.
//!
//! Run with: `cargo run --example schedule_usage`

use chrono::NaiveDate;
use weekplan::catalogue::TaskDefinition;
use weekplan::week_master::{BlackoutRule, Repetition, WeekMasterBuilder};
use weekplan::{Scheduler, SchedulerConfig};

fn main() {
    println!("=== Maintenance Scheduling Example ===\n");

    // A small catalogue: three recurring trade tasks.
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let tasks = vec![
        TaskDefinition::new(1, "PM-0001", "Belt inspection", "Monthly", 4, "Mechanical", 8, base),
        TaskDefinition::new(2, "PM-0002", "Panel thermography", "3 Monthly", 13, "Electrical", 12, base),
        TaskDefinition::new(3, "PM-0003", "Chiller service", "6 Monthly", 26, "Mechanical", 40, base),
    ];

    // Week master for 2024-2027 with a yearly Christmas blackout.
    let week_master = WeekMasterBuilder::new(2024, 2028)
        .allowed_hours(80)
        .allowed_tasks(12)
        .blackout(BlackoutRule {
            start: NaiveDate::from_ymd_opt(2024, 12, 25).expect("valid date"),
            end: NaiveDate::from_ymd_opt(2024, 12, 26).expect("valid date"),
            repetition: Repetition::Yearly,
            note: "Christmas shutdown".to_string(),
        })
        .build();
    println!("Week master covers {} weeks", week_master.len());

    let scheduler = Scheduler::new(SchedulerConfig {
        start_year: 2024,
        end_year: 2028,
        hardcap: [(4, 2), (13, 4)].into_iter().collect(),
        seed: Some(42),
    });

    for name in ["top-down-b", "top-down-fb", "bottom-up-b", "bottom-up-fb"] {
        println!("\n--- {name} ---");
        match scheduler.schedule_as_of(&tasks, &week_master, name, base) {
            Ok(schedule) => {
                println!("Placed {} occurrences", schedule.len());
                let displaced = schedule.iter().filter(|row| row.delta_weeks != 0).count();
                println!("Displaced from natural cadence: {displaced}");
                for row in schedule.iter().take(4) {
                    println!(
                        "  {} week {} ({}, delta {})",
                        row.data_source, row.scheduled_week, row.hrs, row.delta_weeks
                    );
                }
            }
            Err(error) => println!("Scheduling failed: {error}"),
        }
    }
}
