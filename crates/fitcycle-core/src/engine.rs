//! The cycle engine
//!
//! Owns the injectable CycleState handle. Every mutation goes through the
//! engine's guarded operations and is persisted through the record store;
//! nothing writes state fields directly from the outside.

use chrono::NaiveDate;
use fitcycle_model::{CycleState, Metric, Session, SetLog};
use fitcycle_plan::Plan;
use fitcycle_store::RecordStore;
use fitcycle_util::SetLogId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    autofill, cycle, stats, CompletedWorkout, CoreError, CoreEvent, CoreResult, SequenceError,
    StatsSummary, WorkoutWizard,
};

/// The cycle engine
pub struct CycleEngine {
    plan: Plan,
    store: Arc<dyn RecordStore>,
    state: CycleState,
}

impl CycleEngine {
    /// Create an engine, loading (or initializing) the persisted cycle state
    pub fn new(plan: Plan, store: Arc<dyn RecordStore>) -> CoreResult<Self> {
        let state = match store.get_state()? {
            Some(state) => state,
            None => {
                let state = CycleState::inactive();
                store.put_state(&state)?;
                state
            }
        };

        info!(
            active = state.active,
            completed = state.completed_workout_days.len(),
            rest_used = state.rest_days_used,
            "Cycle engine initialized"
        );

        Ok(Self { plan, store, state })
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The session logged for `today`, if any
    pub fn today_session(&self, today: NaiveDate) -> CoreResult<Option<Session>> {
        Ok(self.store.get_session_by_date(today)?)
    }

    /// The workout day a log started now would record: day 1 on a cold
    /// start, otherwise the next due day. `None` when only rest remains.
    pub fn pending_workout_day(&self) -> Option<u8> {
        if !self.state.active {
            return Some(1);
        }
        self.state.next_workout_day()
    }

    /// Whether a workout may be logged today
    pub fn can_log_workout(&self, today: NaiveDate) -> CoreResult<bool> {
        let has_session = self.today_session(today)?.is_some();
        Ok(cycle::can_log_workout(&self.state, has_session))
    }

    /// Handle cycle expiry. Must run before any other operation that reads
    /// state on a new day; all engine entry points call it first.
    pub fn check_expiry(&mut self, today: NaiveDate) -> CoreResult<Option<CoreEvent>> {
        let Some(action) = cycle::expiry_action(&self.state, today) else {
            return Ok(None);
        };

        let mut purged = 0;
        if let Some((from, to)) = action.purge_window {
            // Idempotent: re-running after a partial failure deletes
            // whatever is left of the window and converges.
            let sessions = self.store.list_sessions_in_range(from, to)?;
            for session in &sessions {
                self.store.delete_set_logs_for_session(&session.id)?;
                self.store.delete_session(&session.id)?;
            }
            purged = sessions.len();
            warn!(
                window_start = %from,
                window_end = %to,
                purged_sessions = purged,
                "Incomplete cycle expired; window purged"
            );
        } else {
            info!("Cycle window elapsed; state reset");
        }

        self.state = CycleState::inactive();
        self.store.put_state(&self.state)?;

        Ok(Some(CoreEvent::CycleExpired {
            purged_sessions: purged,
        }))
    }

    /// Start the logging wizard for today's workout.
    ///
    /// Checks expiry and legality, picks the due day, and prefills
    /// suggested weights from history.
    pub fn begin_workout(&mut self, today: NaiveDate) -> CoreResult<WorkoutWizard> {
        self.check_expiry(today)?;

        if self.today_session(today)?.is_some() {
            return Err(SequenceError::AlreadyLoggedToday.into());
        }
        if self.state.is_complete() {
            return Err(SequenceError::CycleComplete.into());
        }
        let day = self
            .pending_workout_day()
            .ok_or(SequenceError::WorkoutDaysExhausted)?;
        let plan_day = self.plan.day(day).ok_or(CoreError::PlanDayMissing(day))?;

        let mut wizard = WorkoutWizard::new(plan_day, self.plan.target_reps(day));
        for (index, exercise) in plan_day.exercises.iter().enumerate() {
            let history = self
                .store
                .list_set_logs_for_day_exercise(day, &exercise.name)?;
            let suggested = autofill::latest_weights(&history, today);
            wizard.prefill_exercise(index, &suggested);
        }

        debug!(day, steps = wizard.step_count(), "Workout wizard started");
        Ok(wizard)
    }

    /// Most recent weight per set for one (day, exercise) pair, from logs
    /// strictly before `cutoff`
    pub fn latest_weights(
        &self,
        day_number: u8,
        exercise_name: &str,
        cutoff: NaiveDate,
    ) -> CoreResult<BTreeMap<u32, f64>> {
        let history = self
            .store
            .list_set_logs_for_day_exercise(day_number, exercise_name)?;
        Ok(autofill::latest_weights(&history, cutoff))
    }

    /// Persist a finished workout draft and advance the cycle.
    ///
    /// The transition is validated before anything is written; a sequence
    /// error leaves both the store and the state untouched. The set-log
    /// replacement is delete-then-insert and converges under re-runs.
    pub fn save_workout(
        &mut self,
        completed: &CompletedWorkout,
        today: NaiveDate,
    ) -> CoreResult<(Session, Vec<CoreEvent>)> {
        self.check_expiry(today)?;

        if self.today_session(today)?.is_some() {
            return Err(SequenceError::AlreadyLoggedToday.into());
        }

        let was_active = self.state.active;
        let mut next = self.state.clone();
        let recorded_day = cycle::apply_workout(&mut next, today, completed.day_number)?;

        let session = Session::workout(today, recorded_day);
        self.store.put_session(&session)?;

        self.store.delete_set_logs_for_session(&session.id)?;
        for set in &completed.sets {
            if set.weight <= 0.0 {
                continue;
            }
            self.store.add_set_log(&SetLog {
                id: SetLogId::generate(),
                session_id: session.id.clone(),
                date: today,
                day_number: recorded_day,
                exercise_name: set.exercise_name.clone(),
                set_number: set.set_number,
                reps: completed.target_reps,
                weight: set.weight,
                created_at: fitcycle_util::now(),
            })?;
        }

        self.state = next;
        self.store.put_state(&self.state)?;

        let mut events = Vec::new();
        if !was_active {
            events.push(CoreEvent::CycleStarted { start_date: today });
        }
        events.push(CoreEvent::WorkoutLogged {
            date: today,
            day_number: recorded_day,
        });
        if self.state.is_complete() {
            events.push(CoreEvent::CycleCompleted);
        }

        info!(
            date = %today,
            day = recorded_day,
            sets = completed.sets.len(),
            completed = self.state.completed_workout_days.len(),
            "Workout logged"
        );

        Ok((session, events))
    }

    /// Log a rest day
    pub fn log_rest(&mut self, today: NaiveDate) -> CoreResult<(Session, Vec<CoreEvent>)> {
        self.check_expiry(today)?;

        let has_session = self.today_session(today)?.is_some();
        let mut next = self.state.clone();
        cycle::apply_rest(&mut next, has_session)?;

        let session = Session::rest(today);
        self.store.put_session(&session)?;

        self.state = next;
        self.store.put_state(&self.state)?;

        let mut events = vec![CoreEvent::RestLogged {
            date: today,
            rest_days_used: self.state.rest_days_used,
        }];
        if self.state.is_complete() {
            events.push(CoreEvent::CycleCompleted);
        }

        info!(
            date = %today,
            rest_used = self.state.rest_days_used,
            "Rest day logged"
        );

        Ok((session, events))
    }

    /// Recompute the cycle state from raw session history and persist it.
    /// Recovery path for state drift (and after bulk imports).
    pub fn rebuild_state(&mut self, today: NaiveDate) -> CoreResult<&CycleState> {
        let sessions = self.store.list_all_sessions()?;
        self.state = cycle::rebuild_from_sessions(&sessions, today);
        self.store.put_state(&self.state)?;

        info!(
            active = self.state.active,
            completed = self.state.completed_workout_days.len(),
            rest_used = self.state.rest_days_used,
            "Cycle state rebuilt from sessions"
        );

        Ok(&self.state)
    }

    /// Save today's bodyweight, preserving any calorie value already logged
    pub fn record_bodyweight(&self, today: NaiveDate, bodyweight_lb: f64) -> CoreResult<Metric> {
        if !(bodyweight_lb.is_finite() && bodyweight_lb > 0.0) {
            return Err(CoreError::InvalidMetricValue(bodyweight_lb));
        }

        let mut metric = self
            .store
            .get_metric_by_date(today)?
            .unwrap_or_else(|| Metric::empty(today));
        metric.bodyweight_lb = Some(bodyweight_lb);
        metric.updated_at = fitcycle_util::now();
        self.store.put_metric(&metric)?;

        Ok(metric)
    }

    /// Save today's calories, preserving any bodyweight already logged
    pub fn record_calories(&self, today: NaiveDate, calories: f64) -> CoreResult<Metric> {
        if !(calories.is_finite() && calories > 0.0) {
            return Err(CoreError::InvalidMetricValue(calories));
        }

        let mut metric = self
            .store
            .get_metric_by_date(today)?
            .unwrap_or_else(|| Metric::empty(today));
        metric.calories = Some(calories);
        metric.updated_at = fitcycle_util::now();
        self.store.put_metric(&metric)?;

        Ok(metric)
    }

    /// Derived stats over the trailing windows
    pub fn stats_summary(&self, today: NaiveDate) -> CoreResult<StatsSummary> {
        let start_7 = today - chrono::Duration::days(6);
        let start_14 = today - chrono::Duration::days(13);
        let start_30 = today - chrono::Duration::days(29);
        let start_365 = today - chrono::Duration::days(365);

        let sessions_30 = self.store.list_sessions_in_range(start_30, today)?;
        let sessions_7: Vec<_> = sessions_30
            .iter()
            .filter(|s| s.date >= start_7)
            .cloned()
            .collect();

        let metrics_14 = self.store.list_metrics_in_range(start_14, today)?;
        let metrics_7: Vec<_> = metrics_14
            .iter()
            .filter(|m| m.date >= start_7)
            .cloned()
            .collect();
        let metrics_year = self.store.list_metrics_in_range(start_365, today)?;

        Ok(StatsSummary {
            streak_days: stats::compute_streak(&stats::tracked_dates(&sessions_30)),
            workouts_7d: stats::workout_count(&sessions_7),
            workouts_30d: stats::workout_count(&sessions_30),
            avg_calories_7d: stats::average_calories(&metrics_7),
            avg_calories_14d: stats::average_calories(&metrics_14),
            weight_change_14d: stats::weight_change(&metrics_14),
            latest_bodyweight_lb: stats::latest_metric(&metrics_year)
                .and_then(|m| m.bodyweight_lb),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcycle_model::SessionKind;
    use fitcycle_plan::default_plan;
    use fitcycle_store::SqliteStore;
    use fitcycle_util::parse_iso_date;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn engine() -> (CycleEngine, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let engine = CycleEngine::new(default_plan(), store.clone()).unwrap();
        (engine, store)
    }

    /// Drive the wizard to completion with a fixed weight and save
    fn log_full_workout(engine: &mut CycleEngine, today: NaiveDate) -> (Session, Vec<CoreEvent>) {
        let mut wizard = engine.begin_workout(today).unwrap();
        for _ in 0..wizard.step_count() {
            wizard.enter_weight(135.0).unwrap();
            wizard.advance().unwrap();
        }
        let completed = wizard.finish().unwrap();
        engine.save_workout(&completed, today).unwrap()
    }

    #[test]
    fn first_workout_starts_cycle_on_day_one() {
        let (mut engine, _) = engine();

        let (session, events) = log_full_workout(&mut engine, d("2026-03-01"));

        assert_eq!(session.kind, SessionKind::Workout);
        assert_eq!(session.day_number, 1);
        assert!(engine.state().active);
        assert_eq!(engine.state().start_date, Some(d("2026-03-01")));
        assert!(events.contains(&CoreEvent::CycleStarted {
            start_date: d("2026-03-01")
        }));
    }

    #[test]
    fn one_log_per_day() {
        let (mut engine, _) = engine();
        log_full_workout(&mut engine, d("2026-03-01"));

        let err = engine.begin_workout(d("2026-03-01")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Sequence(SequenceError::AlreadyLoggedToday)
        ));

        let err = engine.log_rest(d("2026-03-01")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Sequence(SequenceError::AlreadyLoggedToday)
        ));
    }

    #[test]
    fn out_of_order_save_leaves_everything_untouched() {
        let (mut engine, store) = engine();
        log_full_workout(&mut engine, d("2026-03-01"));
        let state_before = engine.state().clone();

        // Hand-built draft for day 4 while day 2 is due
        let bad = CompletedWorkout {
            day_number: 4,
            target_reps: 6,
            sets: vec![crate::CompletedSet {
                exercise_name: "Barbell Bench Press".into(),
                set_number: 1,
                weight: 185.0,
            }],
        };

        let err = engine.save_workout(&bad, d("2026-03-02")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Sequence(SequenceError::InvalidDayOrder { requested: 4, expected: 2 })
        ));
        assert_eq!(engine.state(), &state_before);
        assert!(store.get_session_by_date(d("2026-03-02")).unwrap().is_none());
    }

    #[test]
    fn rest_before_day_one_is_rejected() {
        let (mut engine, _) = engine();
        let err = engine.log_rest(d("2026-03-01")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Sequence(SequenceError::CycleNotStarted)
        ));
    }

    #[test]
    fn full_week_completes_cycle() {
        let (mut engine, _) = engine();
        let dates = [
            "2026-03-01", "2026-03-02", "2026-03-03", "2026-03-04", "2026-03-05",
        ];
        for date in dates {
            log_full_workout(&mut engine, d(date));
        }
        engine.log_rest(d("2026-03-06")).unwrap();
        let (_, events) = engine.log_rest(d("2026-03-07")).unwrap();

        assert!(engine.state().is_complete());
        assert!(events.contains(&CoreEvent::CycleCompleted));

        // No further logs on the completed cycle
        let err = engine.begin_workout(d("2026-03-07")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Sequence(SequenceError::AlreadyLoggedToday)
        ));
    }

    #[test]
    fn expiry_purges_incomplete_window() {
        let (mut engine, store) = engine();
        log_full_workout(&mut engine, d("2026-03-01"));
        log_full_workout(&mut engine, d("2026-03-02"));

        // A session outside the window must survive the purge
        store
            .put_session(&Session::workout(d("2026-02-10"), 1))
            .unwrap();

        // 8 days after start: window [03-01, 03-07] is purged
        let event = engine.check_expiry(d("2026-03-09")).unwrap().unwrap();
        assert_eq!(event, CoreEvent::CycleExpired { purged_sessions: 2 });

        assert_eq!(engine.state(), &CycleState::inactive());
        assert!(store.get_session_by_date(d("2026-03-01")).unwrap().is_none());
        assert!(store.get_session_by_date(d("2026-03-02")).unwrap().is_none());
        assert!(store.get_session_by_date(d("2026-02-10")).unwrap().is_some());
        assert!(store.list_all_set_logs().unwrap().is_empty());
    }

    #[test]
    fn expiry_of_complete_cycle_keeps_sessions() {
        let (mut engine, store) = engine();
        for date in [
            "2026-03-01", "2026-03-02", "2026-03-03", "2026-03-04", "2026-03-05",
        ] {
            log_full_workout(&mut engine, d(date));
        }
        engine.log_rest(d("2026-03-06")).unwrap();
        engine.log_rest(d("2026-03-07")).unwrap();

        let event = engine.check_expiry(d("2026-03-10")).unwrap().unwrap();
        assert_eq!(event, CoreEvent::CycleExpired { purged_sessions: 0 });
        assert_eq!(engine.state(), &CycleState::inactive());
        assert_eq!(store.list_all_sessions().unwrap().len(), 7);
    }

    #[test]
    fn new_cycle_autofills_last_weights() {
        let (mut engine, _) = engine();

        // Week one: complete the cycle so expiry keeps its history
        log_full_workout(&mut engine, d("2026-03-01"));
        for date in ["2026-03-02", "2026-03-03", "2026-03-04", "2026-03-05"] {
            log_full_workout(&mut engine, d(date));
        }
        engine.log_rest(d("2026-03-06")).unwrap();
        engine.log_rest(d("2026-03-07")).unwrap();

        // Next week: expiry resets, new day 1 wizard suggests 135
        let wizard = engine.begin_workout(d("2026-03-09")).unwrap();
        assert_eq!(wizard.current().weight, Some(135.0));

        let weights = engine
            .latest_weights(1, "Barbell Bench Press", d("2026-03-09"))
            .unwrap();
        assert_eq!(weights.get(&1), Some(&135.0));
    }

    #[test]
    fn rebuild_state_recovers_from_drift() {
        let (mut engine, store) = engine();
        log_full_workout(&mut engine, d("2026-03-01"));
        engine.log_rest(d("2026-03-02")).unwrap();

        // Simulate drift: state record lost
        store.put_state(&CycleState::inactive()).unwrap();
        let mut engine = CycleEngine::new(default_plan(), store).unwrap();
        assert!(!engine.state().active);

        let state = engine.rebuild_state(d("2026-03-03")).unwrap();
        assert!(state.active);
        assert_eq!(state.start_date, Some(d("2026-03-01")));
        assert_eq!(state.rest_days_used, 1);
    }

    #[test]
    fn metric_quick_track_merges_fields() {
        let (engine, store) = engine();

        engine.record_bodyweight(d("2026-03-01"), 212.0).unwrap();
        engine.record_calories(d("2026-03-01"), 2600.0).unwrap();

        let metric = store.get_metric_by_date(d("2026-03-01")).unwrap().unwrap();
        assert_eq!(metric.bodyweight_lb, Some(212.0));
        assert_eq!(metric.calories, Some(2600.0));

        assert!(matches!(
            engine.record_bodyweight(d("2026-03-01"), 0.0),
            Err(CoreError::InvalidMetricValue(_))
        ));
    }

    #[test]
    fn stats_summary_over_history() {
        let (mut engine, _) = engine();
        log_full_workout(&mut engine, d("2026-03-01"));
        engine.log_rest(d("2026-03-02")).unwrap();
        log_full_workout(&mut engine, d("2026-03-03"));
        engine.record_bodyweight(d("2026-03-01"), 214.0).unwrap();
        engine.record_bodyweight(d("2026-03-03"), 213.0).unwrap();
        engine.record_calories(d("2026-03-03"), 2500.0).unwrap();

        let summary = engine.stats_summary(d("2026-03-03")).unwrap();
        assert_eq!(summary.streak_days, 3);
        assert_eq!(summary.workouts_7d, 2);
        assert_eq!(summary.workouts_30d, 2);
        assert_eq!(summary.avg_calories_7d, Some(2500.0));
        assert_eq!(summary.weight_change_14d, Some(-1.0));
        assert_eq!(summary.latest_bodyweight_lb, Some(213.0));
    }
}
