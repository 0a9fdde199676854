//! CSV input and output, using the source system's original column names.
//!
//! Readers tolerate extra annotation columns; writers emit the bottom-up and
//! top-down schedule layouts.

use std::io::{Read, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalogue::{clean_catalogue, CatalogueError, RawTaskRecord, TaskDefinition};
use crate::schedule::{Occurrence, ScheduleTable};
use crate::week_master::{WeekCapacity, WeekMaster};
use crate::Key;

/// Errors raised while reading or writing CSV data.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

#[derive(Debug, Deserialize)]
struct RawTaskRow {
    #[serde(rename = "Index")]
    index: Key,
    #[serde(rename = "Data Source")]
    data_source: String,
    #[serde(rename = "Task Description")]
    task_description: String,
    #[serde(rename = "Task Sequence")]
    task_sequence: String,
    #[serde(rename = "Task Sequence (Weeks)")]
    task_sequence_weeks: u32,
    #[serde(rename = "Trade")]
    trade: String,
    #[serde(rename = "Hrs")]
    hrs: u32,
    #[serde(rename = "Consolidated Dates")]
    consolidated_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct WeekMasterRow {
    #[serde(rename = "ScheduledWeek")]
    scheduled_week: NaiveDate,
    #[serde(rename = "AllowedHours")]
    allowed_hours: u32,
    #[serde(rename = "AllowedTasks")]
    allowed_tasks: u32,
}

/// Reads a raw task catalogue and cleans it in one step.
pub fn read_task_catalogue<R: Read>(
    reader: R,
    max_allowed_hours: u32,
) -> Result<Vec<TaskDefinition>, IoError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RawTaskRow>() {
        let row = row?;
        records.push(RawTaskRecord {
            index: row.index,
            data_source: row.data_source,
            task_description: row.task_description,
            task_sequence: row.task_sequence,
            task_sequence_weeks: row.task_sequence_weeks,
            trade: row.trade,
            hrs: row.hrs,
            consolidated_date: row.consolidated_date,
        });
    }
    Ok(clean_catalogue(records, max_allowed_hours)?)
}

/// Reads a week master table; annotation columns beyond the capacity ones
/// are ignored.
pub fn read_week_master<R: Read>(reader: R) -> Result<WeekMaster, IoError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut master = WeekMaster::new();
    for row in csv_reader.deserialize::<WeekMasterRow>() {
        let row = row?;
        master.insert(
            row.scheduled_week,
            WeekCapacity::new(row.allowed_hours, row.allowed_tasks),
        );
    }
    Ok(master)
}

#[derive(Debug, Serialize)]
struct BottomUpRow<'a> {
    #[serde(rename = "Key")]
    key: Key,
    #[serde(rename = "DataSource")]
    data_source: &'a str,
    #[serde(rename = "TaskDescription")]
    task_description: &'a str,
    #[serde(rename = "TaskSequence")]
    task_sequence: &'a str,
    #[serde(rename = "TaskSequence_Weeks")]
    task_sequence_weeks: u32,
    #[serde(rename = "Trade")]
    trade: &'a str,
    #[serde(rename = "Hrs")]
    hrs: u32,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Week")]
    week: u32,
    #[serde(rename = "EstimatedLastServiceDate")]
    estimated_last_service_date: NaiveDate,
    #[serde(rename = "ScheduledWeek")]
    scheduled_week: NaiveDate,
    #[serde(rename = "TotalCount")]
    total_count: u32,
    #[serde(rename = "DeltaWeeks")]
    delta_weeks: i32,
}

// The csv serializer cannot flatten nested structs, so the top-down layout
// repeats the common columns.
#[derive(Debug, Serialize)]
struct TopDownRow<'a> {
    #[serde(rename = "Key")]
    key: Key,
    #[serde(rename = "DataSource")]
    data_source: &'a str,
    #[serde(rename = "TaskDescription")]
    task_description: &'a str,
    #[serde(rename = "TaskSequence")]
    task_sequence: &'a str,
    #[serde(rename = "TaskSequence_Weeks")]
    task_sequence_weeks: u32,
    #[serde(rename = "Trade")]
    trade: &'a str,
    #[serde(rename = "Hrs")]
    hrs: u32,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Week")]
    week: u32,
    #[serde(rename = "EstimatedLastServiceDate")]
    estimated_last_service_date: NaiveDate,
    #[serde(rename = "ScheduledWeek")]
    scheduled_week: NaiveDate,
    #[serde(rename = "TotalCount")]
    total_count: u32,
    #[serde(rename = "DeltaWeeks")]
    delta_weeks: i32,
    #[serde(rename = "Scheduled_Date")]
    scheduled_date: NaiveDate,
    #[serde(rename = "TenYearTotal")]
    ten_year_total: u32,
    #[serde(rename = "HardCapped")]
    hard_capped: u8,
    #[serde(rename = "WeekPriorityScore")]
    week_priority_score: f64,
    #[serde(rename = "DeltaDays")]
    delta_days: i32,
}

fn common_row(occurrence: &Occurrence) -> BottomUpRow<'_> {
    BottomUpRow {
        key: occurrence.key,
        data_source: &occurrence.data_source,
        task_description: &occurrence.task_description,
        task_sequence: &occurrence.task_sequence,
        task_sequence_weeks: occurrence.task_sequence_weeks,
        trade: &occurrence.trade,
        hrs: occurrence.hrs,
        year: occurrence.year,
        week: occurrence.week,
        estimated_last_service_date: occurrence.estimated_last_service_date,
        scheduled_week: occurrence.scheduled_week,
        total_count: occurrence.total_count,
        delta_weeks: occurrence.delta_weeks,
    }
}

/// Writes a schedule in the bottom-up column layout.
pub fn write_bottom_up_schedule<W: Write>(
    writer: W,
    schedule: &ScheduleTable,
) -> Result<(), IoError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for occurrence in schedule.iter() {
        csv_writer.serialize(common_row(occurrence))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes a schedule in the top-down column layout (the bottom-up columns
/// plus the packing diagnostics).
pub fn write_top_down_schedule<W: Write>(
    writer: W,
    schedule: &ScheduleTable,
) -> Result<(), IoError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for occurrence in schedule.iter() {
        csv_writer.serialize(TopDownRow {
            key: occurrence.key,
            data_source: &occurrence.data_source,
            task_description: &occurrence.task_description,
            task_sequence: &occurrence.task_sequence,
            task_sequence_weeks: occurrence.task_sequence_weeks,
            trade: &occurrence.trade,
            hrs: occurrence.hrs,
            year: occurrence.year,
            week: occurrence.week,
            estimated_last_service_date: occurrence.estimated_last_service_date,
            scheduled_week: occurrence.scheduled_week,
            total_count: occurrence.total_count,
            delta_weeks: occurrence.delta_weeks,
            scheduled_date: occurrence.scheduled_date,
            ten_year_total: occurrence.ten_year_total,
            hard_capped: occurrence.hard_capped as u8,
            week_priority_score: occurrence.week_priority_score,
            delta_days: occurrence.delta_days(),
        })?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, task};

    const RAW_TASKS: &str = "\
Index,Data Source,Task Description,Task Sequence,Task Sequence (Weeks),Trade,Hrs,Consolidated Dates
2,PM-0002,Belt inspection,Monthly,4,Mechanical,8,2024-01-01
1,PM-0001,Panel thermography,3 Monthly,13,Electrical,12,2024-02-05
";

    #[test]
    fn reads_and_cleans_a_task_catalogue() {
        let tasks = read_task_catalogue(RAW_TASKS.as_bytes(), 80).unwrap();
        assert_eq!(tasks.len(), 2);
        // Cleaning sorts by key.
        assert_eq!(tasks[0].key, 1);
        assert_eq!(tasks[0].trade, "Electrical");
        assert_eq!(tasks[1].base_date, date(2024, 1, 1));
    }

    #[test]
    fn over_length_task_fails_cleaning() {
        let raw = "\
Index,Data Source,Task Description,Task Sequence,Task Sequence (Weeks),Trade,Hrs,Consolidated Dates
1,PM-0001,Overhaul,Yearly,52,Mechanical,120,2024-01-01
";
        let err = read_task_catalogue(raw.as_bytes(), 80).unwrap_err();
        assert!(matches!(err, IoError::Catalogue(_)));
    }

    #[test]
    fn reads_week_master_ignoring_extra_columns() {
        let raw = "\
ScheduledWeek,AllowedHours,AllowedTasks,NotesBlackout
2024-01-01,80,12,
2024-01-08,64,12,Public holiday
";
        let master = read_week_master(raw.as_bytes()).unwrap();
        assert_eq!(master.len(), 2);
        assert_eq!(master.capacity(date(2024, 1, 8)).unwrap().allowed_hours, 64);
    }

    #[test]
    fn bottom_up_layout_headers() {
        let t = task(1, "PM-0001", 4, 8, date(2024, 1, 1));
        let schedule = ScheduleTable::from_rows(vec![Occurrence::for_date(
            &t,
            date(2024, 1, 1),
            1,
            13,
        )]);
        let mut out = Vec::new();
        write_bottom_up_schedule(&mut out, &schedule).unwrap();
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "Key,DataSource,TaskDescription,TaskSequence,TaskSequence_Weeks,Trade,Hrs,Year,Week,\
             EstimatedLastServiceDate,ScheduledWeek,TotalCount,DeltaWeeks"
        );
        assert!(text.lines().nth(1).unwrap().starts_with("1,PM-0001,"));
    }

    #[test]
    fn top_down_layout_appends_packing_columns() {
        let t = task(1, "PM-0001", 4, 8, date(2024, 1, 1));
        let mut occurrence = Occurrence::for_date(&t, date(2024, 1, 1), 1, 13);
        occurrence.shift_weeks(1);
        let schedule = ScheduleTable::from_rows(vec![occurrence]);
        let mut out = Vec::new();
        write_top_down_schedule(&mut out, &schedule).unwrap();
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.ends_with("Scheduled_Date,TenYearTotal,HardCapped,WeekPriorityScore,DeltaDays"));
        assert!(text.lines().nth(1).unwrap().ends_with(",7"));
    }
}
