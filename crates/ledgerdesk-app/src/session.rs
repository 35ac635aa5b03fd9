// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::OffsetDateTime;

use crate::format::format_amount;
use crate::rules::{
    FieldError, eligible_types, number_len, parse_amount, validate_amount, validate_amount_value,
    validate_number,
};
use crate::{GameId, HistoryRecord, LedgerGateway, SessionContext, TypeOption, UpdatePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Number,
    Amount,
    Game,
    Type,
}

impl EditField {
    pub const ALL: [Self; 4] = [Self::Number, Self::Amount, Self::Game, Self::Type];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Amount => "amount",
            Self::Game => "game",
            Self::Type => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Number(String),
    Amount(String),
    Game { id: GameId, name: String },
    Type(TypeOption),
}

impl FieldChange {
    pub const fn field(&self) -> EditField {
        match self {
            Self::Number(_) => EditField::Number,
            Self::Amount(_) => EditField::Amount,
            Self::Game { .. } => EditField::Game,
            Self::Type(_) => EditField::Type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldErrors {
    pub number: Option<FieldError>,
    pub amount: Option<FieldError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.amount.is_none()
    }

    pub fn get(&self, field: EditField) -> Option<FieldError> {
        match field {
            EditField::Number => self.number,
            EditField::Amount => self.amount,
            EditField::Game | EditField::Type => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EditField, FieldError)> + '_ {
        [
            (EditField::Number, self.number),
            (EditField::Amount, self.amount),
        ]
        .into_iter()
        .filter_map(|(field, error)| error.map(|error| (field, error)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Validation(FieldErrors),
    NoChanges,
    InFlight,
    Closed,
    Collaborator(String),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => {
                let details = errors
                    .iter()
                    .map(|(field, error)| format!("{}: {error}", field.label()))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "record has invalid fields ({details})")
            }
            Self::NoChanges => f.write_str("no changes made to update"),
            Self::InFlight => f.write_str("an update for this record is already in progress"),
            Self::Closed => f.write_str("edit session is already closed"),
            Self::Collaborator(message) => write!(f, "failed to update record: {message}"),
        }
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Clean,
    Editing,
    Invalid,
    Valid,
    Submitted,
    Cancelled,
}

impl SessionPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Cancelled)
    }
}

/// Edit state for a single history record. `current` and `original` are
/// owned copies; nothing here writes back into the caller's collection.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    current: HistoryRecord,
    original: HistoryRecord,
    amount_input: String,
    type_options: Vec<TypeOption>,
    eligible: Vec<TypeOption>,
    errors: FieldErrors,
    dirty: bool,
    touched: bool,
    validated: bool,
    in_flight: bool,
    closed: Option<SessionPhase>,
}

impl EditSession {
    pub fn start(record: &HistoryRecord, type_options: &[TypeOption]) -> Self {
        let mut session = Self {
            current: record.clone(),
            original: record.clone(),
            amount_input: format_amount(record.amount),
            type_options: type_options.to_vec(),
            eligible: Vec::new(),
            errors: FieldErrors::default(),
            dirty: false,
            touched: false,
            validated: false,
            in_flight: false,
            closed: None,
        };
        session.reconcile_type();
        session
    }

    pub fn current(&self) -> &HistoryRecord {
        &self.current
    }

    pub fn original(&self) -> &HistoryRecord {
        &self.original
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn errors(&self) -> FieldErrors {
        self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Type choices legal for the current number.
    pub fn eligible_types(&self) -> &[TypeOption] {
        &self.eligible
    }

    pub fn phase(&self) -> SessionPhase {
        if let Some(closed) = self.closed {
            return closed;
        }
        if !self.errors.is_empty() {
            return SessionPhase::Invalid;
        }
        if !self.touched {
            return SessionPhase::Clean;
        }
        if self.validated {
            SessionPhase::Valid
        } else {
            SessionPhase::Editing
        }
    }

    pub fn change_field(&mut self, change: FieldChange) {
        if self.closed.is_some() || self.in_flight {
            return;
        }
        self.touched = true;

        match change {
            FieldChange::Number(value) => {
                self.errors.number = validate_number(&value);
                self.validated = true;
                self.current.number = value;
                if self.current.number != self.original.number {
                    self.dirty = true;
                }
                self.reconcile_type();
            }
            FieldChange::Amount(value) => {
                self.errors.amount = validate_amount(&value);
                self.validated = true;
                self.current.amount = parse_amount(&value).unwrap_or(0.0);
                self.amount_input = value;
                if self.current.amount != self.original.amount {
                    self.dirty = true;
                }
            }
            FieldChange::Game { id, name } => {
                self.current.game_id = id;
                self.current.game_name = name;
                if self.current.game_id != self.original.game_id {
                    self.dirty = true;
                }
            }
            FieldChange::Type(option) => {
                self.current.type_id = option.id;
                self.current.type_name = option.label;
                if self.current.type_id != self.original.type_id {
                    self.dirty = true;
                }
            }
        }
    }

    /// Swaps in a fresh reference list and re-derives the legal types.
    pub fn set_type_options(&mut self, type_options: &[TypeOption]) {
        if self.closed.is_some() {
            return;
        }
        self.type_options = type_options.to_vec();
        self.reconcile_type();
    }

    /// Validates everything and, when the edit is submittable, marks the
    /// session busy and returns the payload to hand to the backend.
    pub fn begin_submit(
        &mut self,
        context: &SessionContext,
        now: OffsetDateTime,
    ) -> Result<UpdatePayload, SubmitError> {
        if self.closed.is_some() {
            return Err(SubmitError::Closed);
        }
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }

        self.errors = FieldErrors {
            number: validate_number(&self.current.number),
            amount: validate_amount_value(self.current.amount),
        };
        self.validated = true;
        if !self.errors.is_empty() {
            return Err(SubmitError::Validation(self.errors));
        }
        if !self.dirty {
            return Err(SubmitError::NoChanges);
        }

        self.in_flight = true;
        Ok(UpdatePayload {
            id: self.original.id,
            number: self.current.number.clone(),
            game_id: self.current.game_id,
            game_name: self.current.game_name.clone(),
            type_id: self.current.type_id,
            type_name: self.current.type_name.clone(),
            amount: self.current.amount,
            created_at: self.original.created_at,
            created_at_raw: self.original.created_at_raw.clone(),
            modified_at: now,
            business_date: self.current.business_date,
            user_id: context.user_id,
            group_id: self.current.group_id,
            group_name: self.current.group_name.clone(),
        })
    }

    pub fn finish_submit(&mut self, outcome: Result<()>) -> Result<(), SubmitError> {
        self.in_flight = false;
        match outcome {
            Ok(()) => {
                self.closed = Some(SessionPhase::Submitted);
                Ok(())
            }
            Err(error) => Err(SubmitError::Collaborator(format!("{error:#}"))),
        }
    }

    pub fn submit<G: LedgerGateway + ?Sized>(
        &mut self,
        gateway: &mut G,
        context: &SessionContext,
        now: OffsetDateTime,
    ) -> Result<(), SubmitError> {
        let payload = self.begin_submit(context, now)?;
        let outcome = gateway.submit_update(&payload);
        self.finish_submit(outcome)
    }

    pub fn cancel(&mut self) {
        if self.closed.is_none() {
            self.closed = Some(SessionPhase::Cancelled);
        }
    }

    fn reconcile_type(&mut self) {
        self.eligible = eligible_types(number_len(&self.current.number), &self.type_options);
        if self
            .eligible
            .iter()
            .any(|option| option.id == self.current.type_id)
        {
            return;
        }
        let replacement = self.eligible.first().cloned().unwrap_or_else(TypeOption::none);
        self.current.type_id = replacement.id;
        self.current.type_name = replacement.label;
    }
}

#[cfg(test)]
mod tests {
    use super::{EditSession, FieldChange, FieldErrors, SessionPhase, SubmitError};
    use crate::rules::FieldError;
    use crate::{
        BetTypeId, GameId, GroupId, HistoryId, HistoryRecord, SessionContext, TypeOption, UserId,
    };
    use anyhow::anyhow;
    use time::{Date, Month, OffsetDateTime};

    fn types() -> Vec<TypeOption> {
        vec![
            TypeOption::new(2, "Jodi"),
            TypeOption::new(3, "Open Pana"),
            TypeOption::new(4, "Open"),
            TypeOption::new(7, "Close"),
            TypeOption::new(9, "Close Pana"),
        ]
    }

    fn record(number: &str, type_id: i64, type_name: &str) -> HistoryRecord {
        HistoryRecord {
            id: HistoryId::new(41),
            created_at: OffsetDateTime::UNIX_EPOCH,
            created_at_raw: "1970-01-01 00:00:00".to_owned(),
            modified_at: None,
            number: number.to_owned(),
            game_id: GameId::new(1),
            game_name: "Kalyan".to_owned(),
            type_id: BetTypeId::new(type_id),
            type_name: type_name.to_owned(),
            amount: 50.0,
            user_id: UserId::new(7),
            business_date: Date::from_calendar_date(2026, Month::March, 2).expect("valid date"),
            group_id: GroupId::new(3),
            group_name: "North".to_owned(),
        }
    }

    fn context() -> SessionContext {
        SessionContext {
            user_id: UserId::new(7),
        }
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + time::Duration::days(20_000)
    }

    #[test]
    fn start_copies_record_and_is_clean() {
        let source = record("123", 3, "Open Pana");
        let session = EditSession::start(&source, &types());

        assert_eq!(session.current(), &source);
        assert_eq!(session.original(), &source);
        assert!(!session.is_dirty());
        assert!(session.errors().is_empty());
        assert_eq!(session.phase(), SessionPhase::Clean);
        assert_eq!(session.amount_input(), "50");
    }

    #[test]
    fn edits_never_touch_the_source_record() {
        let source = record("123", 3, "Open Pana");
        let mut session = EditSession::start(&source, &types());
        session.change_field(FieldChange::Number("45".to_owned()));

        assert_eq!(source.number, "123");
        assert_eq!(session.original().number, "123");
        assert_eq!(session.current().number, "45");
    }

    #[test]
    fn shortening_pana_to_two_digits_snaps_to_jodi() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Number("12".to_owned()));

        assert_eq!(session.current().type_id, BetTypeId::new(2));
        assert_eq!(session.current().type_name, "Jodi");
        assert_eq!(session.eligible_types(), &[TypeOption::new(2, "Jodi")]);
    }

    #[test]
    fn eligible_current_type_is_kept() {
        let mut session = EditSession::start(&record("123", 9, "Close Pana"), &types());
        session.change_field(FieldChange::Number("456".to_owned()));
        assert_eq!(session.current().type_id, BetTypeId::new(9));
    }

    #[test]
    fn over_long_number_clears_type() {
        let mut session = EditSession::start(&record("12", 2, "Jodi"), &types());
        session.change_field(FieldChange::Number("1234".to_owned()));

        assert_eq!(session.current().type_id, BetTypeId::NONE);
        assert!(session.current().type_name.is_empty());
        assert_eq!(session.errors().number, Some(FieldError::ExceedsLength));
        assert_eq!(session.phase(), SessionPhase::Invalid);
    }

    #[test]
    fn start_snaps_ineligible_type_without_marking_dirty() {
        let session = EditSession::start(&record("5", 2, "Jodi"), &types());
        assert_eq!(session.current().type_id, BetTypeId::new(4));
        assert!(!session.is_dirty());
    }

    #[test]
    fn late_type_list_triggers_reconcile() {
        let mut session = EditSession::start(&record("5", 4, "Open"), &[]);
        assert_eq!(session.current().type_id, BetTypeId::NONE);

        session.set_type_options(&types());
        assert_eq!(session.current().type_id, BetTypeId::new(4));
        assert_eq!(session.current().type_name, "Open");
    }

    #[test]
    fn priority_failure_is_reported_and_cleared() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Number("901".to_owned()));
        assert_eq!(session.errors().number, Some(FieldError::FailsPriorityCheck));

        session.change_field(FieldChange::Number("890".to_owned()));
        assert_eq!(session.errors().number, None);
        assert_eq!(session.phase(), SessionPhase::Valid);
    }

    #[test]
    fn dirty_stays_set_after_reverting_a_field() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Number("124".to_owned()));
        assert!(session.is_dirty());

        session.change_field(FieldChange::Number("123".to_owned()));
        session.change_field(FieldChange::Number("123".to_owned()));
        assert!(session.is_dirty());
    }

    #[test]
    fn unchanged_value_does_not_mark_dirty() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Number("123".to_owned()));
        session.change_field(FieldChange::Amount("50.0".to_owned()));
        assert!(!session.is_dirty());
        assert_eq!(session.phase(), SessionPhase::Valid);
    }

    #[test]
    fn game_and_type_changes_mark_dirty_without_validation() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Game {
            id: GameId::new(2),
            name: "Milan".to_owned(),
        });
        assert!(session.is_dirty());
        assert_eq!(session.phase(), SessionPhase::Editing);

        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Type(TypeOption::new(9, "Close Pana")));
        assert!(session.is_dirty());
        assert_eq!(session.current().type_name, "Close Pana");
    }

    #[test]
    fn submit_without_changes_is_rejected() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        let result = session.begin_submit(&context(), now());
        assert_eq!(result, Err(SubmitError::NoChanges));
        assert!(!session.is_in_flight());
    }

    #[test]
    fn submit_with_zero_amount_reports_amount_error() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Amount("0".to_owned()));

        let result = session.begin_submit(&context(), now());
        assert_eq!(
            result,
            Err(SubmitError::Validation(FieldErrors {
                number: None,
                amount: Some(FieldError::NonPositiveAmount),
            }))
        );
        assert_eq!(session.phase(), SessionPhase::Invalid);
    }

    #[test]
    fn submit_revalidates_untouched_fields() {
        let mut source = record("123", 3, "Open Pana");
        source.number = "321".to_owned();
        let mut session = EditSession::start(&source, &types());
        session.change_field(FieldChange::Amount("75".to_owned()));

        let result = session.begin_submit(&context(), now());
        match result {
            Err(SubmitError::Validation(errors)) => {
                assert_eq!(errors.number, Some(FieldError::FailsPriorityCheck));
                assert_eq!(errors.amount, None);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn payload_carries_original_creation_and_fresh_modification() -> anyhow::Result<()> {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Amount("80".to_owned()));

        let payload = session
            .begin_submit(&context(), now())
            .map_err(|error| anyhow!("{error}"))?;
        assert_eq!(payload.id, HistoryId::new(41));
        assert_eq!(payload.created_at, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(payload.modified_at, now());
        assert_eq!(payload.amount, 80.0);
        assert_eq!(payload.type_id, BetTypeId::new(3));
        assert_eq!(payload.user_id, UserId::new(7));
        assert!(session.is_in_flight());

        assert_eq!(
            session.begin_submit(&context(), now()),
            Err(SubmitError::InFlight)
        );
        Ok(())
    }

    #[test]
    fn failed_backend_call_keeps_session_editable() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Amount("80".to_owned()));
        session
            .begin_submit(&context(), now())
            .expect("payload should build");

        let result = session.finish_submit(Err(anyhow!("connection reset")));
        assert!(matches!(result, Err(SubmitError::Collaborator(_))));
        assert!(!session.is_in_flight());
        assert!(!session.phase().is_terminal());

        session.change_field(FieldChange::Amount("90".to_owned()));
        assert_eq!(session.current().amount, 90.0);
    }

    #[test]
    fn successful_backend_call_closes_session() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Amount("80".to_owned()));
        session
            .begin_submit(&context(), now())
            .expect("payload should build");
        session.finish_submit(Ok(())).expect("submit should succeed");

        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert_eq!(
            session.begin_submit(&context(), now()),
            Err(SubmitError::Closed)
        );
    }

    #[test]
    fn cancel_is_terminal_and_ignores_later_edits() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.cancel();
        session.change_field(FieldChange::Number("4".to_owned()));

        assert_eq!(session.phase(), SessionPhase::Cancelled);
        assert_eq!(session.current().number, "123");
    }

    #[test]
    fn garbage_amount_counts_as_zero() {
        let mut session = EditSession::start(&record("123", 3, "Open Pana"), &types());
        session.change_field(FieldChange::Amount("abc".to_owned()));

        assert_eq!(session.amount_input(), "abc");
        assert_eq!(session.current().amount, 0.0);
        assert_eq!(session.errors().amount, Some(FieldError::NonPositiveAmount));
    }

    #[test]
    fn validation_error_message_names_fields() {
        let error = SubmitError::Validation(FieldErrors {
            number: Some(FieldError::ExceedsLength),
            amount: Some(FieldError::NonPositiveAmount),
        });
        let message = error.to_string();
        assert!(message.contains("number: number cannot exceed 3 digits"));
        assert!(message.contains("amount: amount must be greater than zero"));
    }
}
