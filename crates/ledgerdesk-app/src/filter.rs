// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::rules::parse_amount;
use crate::{BetTypeId, HistoryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeBucket {
    pub type_id: BetTypeId,
    pub label: &'static str,
}

/// Display order of the per-type tables; independent of the data.
pub const TYPE_BUCKETS: [TypeBucket; 5] = [
    TypeBucket {
        type_id: BetTypeId::new(4),
        label: "Open",
    },
    TypeBucket {
        type_id: BetTypeId::new(3),
        label: "Open Pana",
    },
    TypeBucket {
        type_id: BetTypeId::new(2),
        label: "Jodi",
    },
    TypeBucket {
        type_id: BetTypeId::new(7),
        label: "Close",
    },
    TypeBucket {
        type_id: BetTypeId::new(9),
        label: "Close Pana",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub number_query: String,
    pub amount_query: String,
}

impl RecordFilter {
    pub fn new(number_query: &str, amount_query: &str) -> Self {
        Self {
            number_query: number_query.to_owned(),
            amount_query: amount_query.to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.number_query.is_empty() && self.amount_query.trim().is_empty()
    }

    pub fn matches(&self, record: &HistoryRecord) -> bool {
        let number_matches = record
            .number
            .to_lowercase()
            .contains(&self.number_query.to_lowercase());
        if !number_matches {
            return false;
        }
        if self.amount_query.trim().is_empty() {
            return true;
        }
        // An amount query that is not a number matches nothing.
        parse_amount(&self.amount_query).is_some_and(|amount| record.amount == amount)
    }
}

pub fn filter_records<'a>(
    records: &'a [HistoryRecord],
    filter: &RecordFilter,
) -> Vec<&'a HistoryRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    pub bucket: TypeBucket,
    pub records: Vec<&'a HistoryRecord>,
}

impl Partition<'_> {
    pub fn label(&self) -> &'static str {
        self.bucket.label
    }
}

/// One entry per bucket, always in bucket order, empty buckets included.
pub fn partition_by_type<'a>(
    records: &'a [HistoryRecord],
    buckets: &[TypeBucket],
    filter: &RecordFilter,
) -> Vec<Partition<'a>> {
    buckets
        .iter()
        .map(|bucket| Partition {
            bucket: *bucket,
            records: records
                .iter()
                .filter(|record| record.type_id == bucket.type_id && filter.matches(record))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RecordFilter, TYPE_BUCKETS, filter_records, partition_by_type};
    use crate::{BetTypeId, GameId, GroupId, HistoryId, HistoryRecord, UserId};
    use time::{Date, Month, OffsetDateTime};

    fn record(id: i64, number: &str, type_id: i64, amount: f64) -> HistoryRecord {
        HistoryRecord {
            id: HistoryId::new(id),
            created_at: OffsetDateTime::UNIX_EPOCH,
            created_at_raw: String::new(),
            modified_at: None,
            number: number.to_owned(),
            game_id: GameId::new(1),
            game_name: "Kalyan".to_owned(),
            type_id: BetTypeId::new(type_id),
            type_name: String::new(),
            amount,
            user_id: UserId::new(1),
            business_date: Date::from_calendar_date(2026, Month::March, 2).expect("valid date"),
            group_id: GroupId::new(1),
            group_name: String::new(),
        }
    }

    fn ids(records: &[&HistoryRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id.get()).collect()
    }

    #[test]
    fn number_query_is_a_substring_match() {
        let records = vec![
            record(1, "123", 3, 10.0),
            record(2, "321", 3, 10.0),
            record(3, "23", 2, 10.0),
        ];
        let filtered = filter_records(&records, &RecordFilter::new("23", ""));
        assert_eq!(ids(&filtered), vec![1, 3]);
    }

    #[test]
    fn empty_queries_match_everything() {
        let records = vec![record(1, "1", 4, 5.0), record(2, "", 4, 5.0)];
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter_records(&records, &filter)), vec![1, 2]);
    }

    #[test]
    fn amount_query_requires_exact_value() {
        let records = vec![
            record(1, "1", 4, 50.0),
            record(2, "2", 4, 500.0),
            record(3, "3", 4, 50.5),
        ];
        let filtered = filter_records(&records, &RecordFilter::new("", "50"));
        assert_eq!(ids(&filtered), vec![1]);

        let filtered = filter_records(&records, &RecordFilter::new("", "50.50"));
        assert_eq!(ids(&filtered), vec![3]);
    }

    #[test]
    fn non_numeric_amount_query_matches_nothing() {
        let records = vec![record(1, "1", 4, 50.0)];
        assert!(filter_records(&records, &RecordFilter::new("", "fifty")).is_empty());
    }

    #[test]
    fn both_predicates_must_hold() {
        let records = vec![record(1, "12", 2, 10.0), record(2, "12", 2, 20.0)];
        let filtered = filter_records(&records, &RecordFilter::new("1", "20"));
        assert_eq!(ids(&filtered), vec![2]);
    }

    #[test]
    fn partitions_follow_fixed_bucket_order() {
        let records = vec![
            record(1, "99", 2, 10.0),
            record(2, "5", 7, 10.0),
            record(3, "4", 4, 10.0),
            record(4, "90", 2, 10.0),
        ];
        let partitions = partition_by_type(&records, &TYPE_BUCKETS, &RecordFilter::default());

        let labels = partitions
            .iter()
            .map(|partition| partition.label())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Open", "Open Pana", "Jodi", "Close", "Close Pana"]);
        assert_eq!(ids(&partitions[0].records), vec![3]);
        assert!(partitions[1].records.is_empty());
        assert_eq!(ids(&partitions[2].records), vec![1, 4]);
        assert_eq!(ids(&partitions[3].records), vec![2]);
        assert!(partitions[4].records.is_empty());
    }

    #[test]
    fn partitions_apply_the_same_filter() {
        let records = vec![record(1, "99", 2, 10.0), record(2, "90", 2, 10.0)];
        let partitions =
            partition_by_type(&records, &TYPE_BUCKETS, &RecordFilter::new("0", ""));
        assert_eq!(ids(&partitions[2].records), vec![2]);
    }

    #[test]
    fn unknown_types_fall_outside_every_bucket() {
        let records = vec![record(1, "1", 11, 10.0)];
        let partitions = partition_by_type(&records, &TYPE_BUCKETS, &RecordFilter::default());
        assert!(partitions.iter().all(|partition| partition.records.is_empty()));
    }
}
