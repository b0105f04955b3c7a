//! Booking workflow state machine
//!
//! Models the passengers -> payment -> confirmation flow. The machine is
//! UI-agnostic: the HTTP client drives it from user events, and the server
//! re-validates the resulting settlement order before persisting anything.
//!
//! Transitions are linear; the only backward transition is the explicit
//! "Back" action from payment to passengers. Once settlement has started
//! the machine refuses duplicate submission until it is confirmed.

use serde::{Deserialize, Serialize};

/// Passenger cap per booking
pub const MAX_PASSENGERS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BerthPreference {
    Lower,
    Middle,
    Upper,
    #[serde(rename = "Side Lower")]
    SideLower,
    #[serde(rename = "Side Upper")]
    SideUpper,
    #[serde(rename = "No Preference")]
    NoPreference,
}

/// A fully populated passenger, ready for settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub berth_preference: BerthPreference,
}

/// A passenger being edited in the passengers step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerDraft {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub berth_preference: Option<BerthPreference>,
}

impl PassengerDraft {
    /// All four fields are mandatory before the passengers step may advance
    pub fn is_complete(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && self.age.is_some_and(|a| a > 0)
            && self.gender.is_some()
            && self.berth_preference.is_some()
    }

    fn into_passenger(self) -> Option<Passenger> {
        Some(Passenger {
            name: self.name?,
            age: self.age?,
            gender: self.gender?,
            berth_preference: self.berth_preference?,
        })
    }
}

/// Single-field update, one tagged variant per passenger field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassengerUpdate {
    Name(String),
    Age(u8),
    Gender(Gender),
    BerthPreference(BerthPreference),
}

/// Identity fields of the train being booked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainSummary {
    pub id: String,
    pub train_no: String,
    pub name: String,
    pub source: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
}

/// Transient selection written by the search screen and consumed exactly
/// once by the booking workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub train: TrainSummary,
    pub class_code: String,
    pub class_name: String,
    pub fare: i64,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStep {
    Passengers,
    Payment,
    Confirmation,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("At most {MAX_PASSENGERS} passengers per booking")]
    TooManyPassengers,

    #[error("A booking needs at least one passenger")]
    LastPassenger,

    #[error("No passenger at index {0}")]
    NoSuchPassenger(usize),

    #[error("Passenger {0} is missing required fields")]
    IncompletePassenger(usize),

    #[error("Action not allowed in step {0:?}")]
    WrongStep(WorkflowStep),

    #[error("Settlement already in flight")]
    SettlementInFlight,

    #[error("No settlement in flight")]
    NoSettlementInFlight,
}

impl From<WorkflowError> for crate::core::error::RailError {
    fn from(err: WorkflowError) -> Self {
        crate::core::error::RailError::ValidationError(err.to_string())
    }
}

/// Everything the server needs to settle a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOrder {
    pub train_id: String,
    pub class_code: String,
    pub date: String,
    pub passengers: Vec<Passenger>,
}

/// The booking workflow state machine
#[derive(Debug, Clone)]
pub struct BookingWorkflow {
    selection: BookingSelection,
    passengers: Vec<PassengerDraft>,
    step: WorkflowStep,
    settling: bool,
}

impl BookingWorkflow {
    /// Start a new workflow from a consumed selection, with one empty passenger
    pub fn new(selection: BookingSelection) -> Self {
        Self {
            selection,
            passengers: vec![PassengerDraft::default()],
            step: WorkflowStep::Passengers,
            settling: false,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn passengers(&self) -> &[PassengerDraft] {
        &self.passengers
    }

    /// Fare for the current passenger count; fixed at settlement time and
    /// never recomputed afterwards
    pub fn total_fare(&self) -> i64 {
        self.selection.fare * self.passengers.len() as i64
    }

    fn require_step(&self, step: WorkflowStep) -> Result<(), WorkflowError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WorkflowError::WrongStep(self.step))
        }
    }

    /// Add an empty passenger row (cap 6)
    pub fn add_passenger(&mut self) -> Result<usize, WorkflowError> {
        self.require_step(WorkflowStep::Passengers)?;
        if self.passengers.len() >= MAX_PASSENGERS {
            return Err(WorkflowError::TooManyPassengers);
        }
        self.passengers.push(PassengerDraft::default());
        Ok(self.passengers.len() - 1)
    }

    /// Remove a passenger row (floor 1)
    pub fn remove_passenger(&mut self, index: usize) -> Result<(), WorkflowError> {
        self.require_step(WorkflowStep::Passengers)?;
        if self.passengers.len() <= 1 {
            return Err(WorkflowError::LastPassenger);
        }
        if index >= self.passengers.len() {
            return Err(WorkflowError::NoSuchPassenger(index));
        }
        self.passengers.remove(index);
        Ok(())
    }

    /// Apply a single-field update to one passenger
    pub fn update_passenger(
        &mut self,
        index: usize,
        update: PassengerUpdate,
    ) -> Result<(), WorkflowError> {
        self.require_step(WorkflowStep::Passengers)?;
        let draft = self
            .passengers
            .get_mut(index)
            .ok_or(WorkflowError::NoSuchPassenger(index))?;

        match update {
            PassengerUpdate::Name(name) => draft.name = Some(name),
            PassengerUpdate::Age(age) => draft.age = Some(age),
            PassengerUpdate::Gender(gender) => draft.gender = Some(gender),
            PassengerUpdate::BerthPreference(pref) => draft.berth_preference = Some(pref),
        }

        Ok(())
    }

    /// True when every passenger has all mandatory fields populated
    pub fn can_proceed(&self) -> bool {
        self.passengers.iter().all(PassengerDraft::is_complete)
    }

    /// Advance passengers -> payment; refuses when any passenger is incomplete
    pub fn proceed_to_payment(&mut self) -> Result<(), WorkflowError> {
        self.require_step(WorkflowStep::Passengers)?;
        if let Some(index) = self.passengers.iter().position(|p| !p.is_complete()) {
            return Err(WorkflowError::IncompletePassenger(index));
        }
        self.step = WorkflowStep::Payment;
        Ok(())
    }

    /// The single backward transition, payment -> passengers
    pub fn back_to_passengers(&mut self) -> Result<(), WorkflowError> {
        self.require_step(WorkflowStep::Payment)?;
        if self.settling {
            return Err(WorkflowError::SettlementInFlight);
        }
        self.step = WorkflowStep::Passengers;
        Ok(())
    }

    /// Begin settlement and hand out the order to submit
    ///
    /// Further submissions are refused until `confirm` is called; there is
    /// no cancellation of a settlement once started.
    pub fn begin_settlement(&mut self) -> Result<SettlementOrder, WorkflowError> {
        self.require_step(WorkflowStep::Payment)?;
        if self.settling {
            return Err(WorkflowError::SettlementInFlight);
        }

        let passengers = self
            .passengers
            .iter()
            .cloned()
            .map(PassengerDraft::into_passenger)
            .collect::<Option<Vec<_>>>()
            .ok_or(WorkflowError::IncompletePassenger(0))?;

        self.settling = true;

        Ok(SettlementOrder {
            train_id: self.selection.train.id.clone(),
            class_code: self.selection.class_code.clone(),
            date: self.selection.date.clone(),
            passengers,
        })
    }

    /// Settlement attempt failed before a booking was persisted
    ///
    /// Clears the in-flight flag and stays in the payment step, so the
    /// order can be resubmitted or edited via the backward transition.
    pub fn fail_settlement(&mut self) -> Result<(), WorkflowError> {
        self.require_step(WorkflowStep::Payment)?;
        if !self.settling {
            return Err(WorkflowError::NoSettlementInFlight);
        }
        self.settling = false;
        Ok(())
    }

    /// Settlement completed; terminal state, only exit is navigation away
    ///
    /// Only reachable while a settlement is in flight, so a failed or
    /// never-started submission cannot be confirmed.
    pub fn confirm(&mut self) -> Result<(), WorkflowError> {
        self.require_step(WorkflowStep::Payment)?;
        if !self.settling {
            return Err(WorkflowError::NoSettlementInFlight);
        }
        self.settling = false;
        self.step = WorkflowStep::Confirmation;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selection(fare: i64) -> BookingSelection {
        BookingSelection {
            train: TrainSummary {
                id: "1".into(),
                train_no: "12301".into(),
                name: "Rajdhani Express".into(),
                source: "NDLS".into(),
                destination: "HWH".into(),
                departure_time: "16:55".into(),
                arrival_time: "10:00".into(),
                duration: "17h 05m".into(),
            },
            class_code: "3A".into(),
            class_name: "Third AC".into(),
            fare,
            date: "2026-09-01".into(),
        }
    }

    fn fill(workflow: &mut BookingWorkflow, index: usize, name: &str) {
        workflow
            .update_passenger(index, PassengerUpdate::Name(name.into()))
            .unwrap();
        workflow
            .update_passenger(index, PassengerUpdate::Age(30))
            .unwrap();
        workflow
            .update_passenger(index, PassengerUpdate::Gender(Gender::Female))
            .unwrap();
        workflow
            .update_passenger(index, PassengerUpdate::BerthPreference(BerthPreference::Lower))
            .unwrap();
    }

    #[test]
    fn test_starts_with_one_empty_passenger() {
        let workflow = BookingWorkflow::new(selection(1950));
        assert_eq!(workflow.step(), WorkflowStep::Passengers);
        assert_eq!(workflow.passengers().len(), 1);
        assert!(!workflow.can_proceed());
    }

    #[test]
    fn test_incomplete_passenger_blocks_payment() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        workflow
            .update_passenger(0, PassengerUpdate::Name("A".into()))
            .unwrap();
        workflow.update_passenger(0, PassengerUpdate::Age(30)).unwrap();
        // gender and berth preference still missing
        assert_eq!(
            workflow.proceed_to_payment(),
            Err(WorkflowError::IncompletePassenger(0))
        );
        assert_eq!(workflow.step(), WorkflowStep::Passengers);
    }

    #[test]
    fn test_blank_name_is_not_complete() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        fill(&mut workflow, 0, "A");
        workflow
            .update_passenger(0, PassengerUpdate::Name("   ".into()))
            .unwrap();
        assert!(!workflow.can_proceed());
    }

    #[test]
    fn test_passenger_cap_and_floor() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        for _ in 0..5 {
            workflow.add_passenger().unwrap();
        }
        assert_eq!(workflow.add_passenger(), Err(WorkflowError::TooManyPassengers));

        for _ in 0..5 {
            workflow.remove_passenger(0).unwrap();
        }
        assert_eq!(workflow.remove_passenger(0), Err(WorkflowError::LastPassenger));
    }

    #[test]
    fn test_back_is_the_only_backward_transition() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        fill(&mut workflow, 0, "A");
        workflow.proceed_to_payment().unwrap();
        assert_eq!(workflow.step(), WorkflowStep::Payment);

        workflow.back_to_passengers().unwrap();
        assert_eq!(workflow.step(), WorkflowStep::Passengers);

        // Passenger edits remain after going back
        assert!(workflow.can_proceed());
    }

    #[test]
    fn test_settlement_order_and_duplicate_submission() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        fill(&mut workflow, 0, "A");
        let second = workflow.add_passenger().unwrap();
        fill(&mut workflow, second, "B");
        workflow.proceed_to_payment().unwrap();

        let order = workflow.begin_settlement().unwrap();
        assert_eq!(order.passengers.len(), 2);
        assert_eq!(order.class_code, "3A");
        assert_eq!(workflow.total_fare(), 3900);

        // Resubmission while settling is refused, as is going back
        assert_eq!(
            workflow.begin_settlement().unwrap_err(),
            WorkflowError::SettlementInFlight
        );
        assert_eq!(
            workflow.back_to_passengers().unwrap_err(),
            WorkflowError::SettlementInFlight
        );

        workflow.confirm().unwrap();
        assert_eq!(workflow.step(), WorkflowStep::Confirmation);

        // Confirmation is terminal
        assert!(workflow.add_passenger().is_err());
        assert!(workflow.proceed_to_payment().is_err());
    }

    #[test]
    fn test_confirm_requires_settlement() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        fill(&mut workflow, 0, "A");
        workflow.proceed_to_payment().unwrap();
        assert_eq!(
            workflow.confirm().unwrap_err(),
            WorkflowError::NoSettlementInFlight
        );
    }

    #[test]
    fn test_failed_settlement_returns_to_payment() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        fill(&mut workflow, 0, "A");
        workflow.proceed_to_payment().unwrap();

        workflow.begin_settlement().unwrap();
        workflow.fail_settlement().unwrap();
        assert_eq!(workflow.step(), WorkflowStep::Payment);

        // A failed submission cannot be confirmed
        assert_eq!(
            workflow.confirm().unwrap_err(),
            WorkflowError::NoSettlementInFlight
        );

        // The machine is not stuck: retry and the backward transition both work
        workflow.begin_settlement().unwrap();
        workflow.fail_settlement().unwrap();
        workflow.back_to_passengers().unwrap();
        assert_eq!(workflow.step(), WorkflowStep::Passengers);
    }

    #[test]
    fn test_fail_settlement_requires_one_in_flight() {
        let mut workflow = BookingWorkflow::new(selection(1950));
        fill(&mut workflow, 0, "A");
        workflow.proceed_to_payment().unwrap();
        assert_eq!(
            workflow.fail_settlement().unwrap_err(),
            WorkflowError::NoSettlementInFlight
        );
    }

    #[test]
    fn test_berth_preference_wire_names() {
        let json = serde_json::to_string(&BerthPreference::SideLower).unwrap();
        assert_eq!(json, "\"Side Lower\"");
        let parsed: BerthPreference = serde_json::from_str("\"No Preference\"").unwrap();
        assert_eq!(parsed, BerthPreference::NoPreference);
    }

    proptest! {
        #[test]
        fn prop_total_fare_is_fare_times_count(fare in 1i64..10_000, extra in 0usize..5) {
            let mut workflow = BookingWorkflow::new(selection(fare));
            fill(&mut workflow, 0, "P0");
            for i in 0..extra {
                let idx = workflow.add_passenger().unwrap();
                fill(&mut workflow, idx, &format!("P{}", i + 1));
            }
            prop_assert_eq!(workflow.total_fare(), fare * (extra as i64 + 1));
        }
    }
}
