//! Reservation lifecycle: validation, creation, return

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    clock::Clock,
    error::{AppError, AppResult, FieldErrors},
    models::reservation::{
        CreateReservation, NewReservation, ReservationChanges, ReservationFilter,
        ReservationQuery, ReservationResponse, ReturnReservation, UpdateReservation,
        ALREADY_RETURNED, BOOK_NOT_AVAILABLE, DUE_TIME_NOT_AFTER_RESERVATION,
        DUE_TIME_NOT_FUTURE,
    },
    repository::reservations::ReservationStore,
};

/// Values a reservation would hold once written
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Due time sent by the client, if any
    pub requested_due_time: Option<DateTime<Utc>>,
    pub due_time: DateTime<Utc>,
    pub reservation_time: DateTime<Utc>,
    /// Availability of the target book; `None` when an update keeps its book
    pub book_available: Option<bool>,
}

/// Check a candidate against the reservation rules, collecting every violation
pub fn validate_candidate(candidate: &Candidate, now: DateTime<Utc>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(due_time) = candidate.requested_due_time {
        if due_time <= now {
            errors.add("due_time", DUE_TIME_NOT_FUTURE);
        }
    }

    if candidate.due_time <= candidate.reservation_time {
        errors.add("due_time", DUE_TIME_NOT_AFTER_RESERVATION);
    }

    if candidate.book_available == Some(false) {
        errors.add("book", BOOK_NOT_AVAILABLE);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn does_not_exist(id: i32) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

#[derive(Clone)]
pub struct ReservationsService {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
}

impl ReservationsService {
    pub fn new(store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// List reservations, optionally only the overdue ones
    pub async fn list(&self, query: &ReservationQuery) -> AppResult<Vec<ReservationResponse>> {
        let now = self.clock.now();
        let filter = ReservationFilter {
            overdue_at: query.overdue_only().then_some(now),
            status: query.status,
            book_id: query.book,
            user_id: query.user,
        };

        let reservations = self.store.list(&filter).await?;
        Ok(reservations
            .into_iter()
            .map(|r| ReservationResponse::new(r, now))
            .collect())
    }

    pub async fn get(&self, id: i32) -> AppResult<ReservationResponse> {
        let reservation = self.store.get(id).await?;
        Ok(ReservationResponse::new(reservation, self.clock.now()))
    }

    /// Reserve a book: validate, then store the reservation and take the book
    pub async fn create(&self, data: &CreateReservation) -> AppResult<ReservationResponse> {
        let now = self.clock.now();
        let reservation_time = data.reservation_time.unwrap_or(now);
        let mut errors = FieldErrors::new();

        let book_available = match self.store.book_availability(data.book).await? {
            Some(available) => Some(available),
            None => {
                errors.add("book", does_not_exist(data.book));
                None
            }
        };

        if !self.store.user_exists(data.user).await? {
            errors.add("user", does_not_exist(data.user));
        }

        let candidate = Candidate {
            requested_due_time: Some(data.due_time),
            due_time: data.due_time,
            reservation_time,
            book_available,
        };
        if let Err(violations) = validate_candidate(&candidate, now) {
            errors.merge(violations);
        }
        errors.into_result()?;

        let reservation = self
            .store
            .insert_active(&NewReservation {
                book_id: data.book,
                user_id: data.user,
                reservation_time,
                due_time: data.due_time,
            })
            .await?;

        tracing::info!(
            reservation_id = reservation.id,
            book_id = reservation.book_id,
            due_time = %reservation.due_time,
            "Reservation created"
        );

        Ok(ReservationResponse::new(reservation, now))
    }

    /// Update book, due time or reservation time
    pub async fn update(&self, id: i32, data: &UpdateReservation) -> AppResult<ReservationResponse> {
        let now = self.clock.now();
        let current = self.store.get(id).await?;
        let mut errors = FieldErrors::new();

        let book_id = data.book.unwrap_or(current.book_id);
        let book_available = if book_id == current.book_id {
            None
        } else {
            match self.store.book_availability(book_id).await? {
                Some(available) => Some(available),
                None => {
                    errors.add("book", does_not_exist(book_id));
                    None
                }
            }
        };

        let candidate = Candidate {
            requested_due_time: data.due_time,
            due_time: data.due_time.unwrap_or(current.due_time),
            reservation_time: data.reservation_time.unwrap_or(current.reservation_time),
            book_available,
        };
        if let Err(violations) = validate_candidate(&candidate, now) {
            errors.merge(violations);
        }
        errors.into_result()?;

        let reservation = self
            .store
            .update(
                id,
                &ReservationChanges {
                    book_id,
                    reservation_time: candidate.reservation_time,
                    due_time: candidate.due_time,
                },
            )
            .await?;

        if reservation.book_id != current.book_id {
            tracing::info!(
                reservation_id = id,
                from_book = current.book_id,
                to_book = reservation.book_id,
                "Reservation moved to another book"
            );
        }

        Ok(ReservationResponse::new(reservation, now))
    }

    /// Complete a reservation and make its book available again
    pub async fn return_book(
        &self,
        id: i32,
        data: &ReturnReservation,
    ) -> AppResult<ReservationResponse> {
        let current = self.store.get(id).await?;
        if current.is_completed() {
            return Err(AppError::BusinessRule(ALREADY_RETURNED.to_string()));
        }

        let now = self.clock.now();
        let return_time = data.return_time.unwrap_or(now);
        let reservation = self.store.complete(id, return_time).await?;

        tracing::info!(
            reservation_id = id,
            book_id = reservation.book_id,
            "Book returned"
        );

        Ok(ReservationResponse::new(reservation, now))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.delete(id).await?;
        tracing::info!(reservation_id = id, "Reservation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        models::reservation::{Reservation, ReservationStatus},
        repository::reservations::MockReservationStore,
    };
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::{collections::HashMap, sync::Mutex};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn service(store: impl ReservationStore + 'static) -> ReservationsService {
        ReservationsService::new(Arc::new(store), Arc::new(FixedClock(now())))
    }

    fn stored(id: i32, status: ReservationStatus, book_id: i32) -> Reservation {
        Reservation {
            id,
            status,
            reservation_time: now() - Duration::days(1),
            due_time: now() + Duration::days(6),
            return_time: None,
            book_id,
            user_id: 1,
            created_at: now() - Duration::days(1),
            updated_at: now() - Duration::days(1),
        }
    }

    fn request(book: i32, due_time: DateTime<Utc>) -> CreateReservation {
        CreateReservation { book, user: 1, due_time, reservation_time: None }
    }

    fn store_with_book(available: bool) -> MockReservationStore {
        let mut store = MockReservationStore::new();
        store
            .expect_book_availability()
            .returning(move |_| Ok(Some(available)));
        store.expect_user_exists().returning(|_| Ok(true));
        store
    }

    fn field_errors(result: AppResult<ReservationResponse>) -> FieldErrors {
        match result {
            Err(AppError::InvalidFields(errors)) => errors,
            other => panic!("expected field errors, got {:?}", other.map(|r| r.id)),
        }
    }

    // =========================================================================
    // Validator
    // =========================================================================

    #[test]
    fn test_validator_accepts_valid_candidate() {
        let candidate = Candidate {
            requested_due_time: Some(now() + Duration::days(7)),
            due_time: now() + Duration::days(7),
            reservation_time: now(),
            book_available: Some(true),
        };
        assert!(validate_candidate(&candidate, now()).is_ok());
    }

    #[test]
    fn test_validator_collects_every_violation() {
        let candidate = Candidate {
            requested_due_time: Some(now() - Duration::hours(1)),
            due_time: now() - Duration::hours(1),
            reservation_time: now(),
            book_available: Some(false),
        };
        let errors = validate_candidate(&candidate, now()).unwrap_err();

        assert_eq!(
            errors.get("due_time"),
            Some(&[DUE_TIME_NOT_FUTURE.to_string(), DUE_TIME_NOT_AFTER_RESERVATION.to_string()][..])
        );
        assert_eq!(errors.get("book"), Some(&[BOOK_NOT_AVAILABLE.to_string()][..]));
    }

    #[test]
    fn test_validator_due_time_equal_to_now_is_rejected() {
        let candidate = Candidate {
            requested_due_time: Some(now()),
            due_time: now(),
            reservation_time: now() - Duration::days(1),
            book_available: None,
        };
        let errors = validate_candidate(&candidate, now()).unwrap_err();
        assert_eq!(errors.get("due_time"), Some(&[DUE_TIME_NOT_FUTURE.to_string()][..]));
    }

    #[test]
    fn test_validator_skips_book_check_when_book_unchanged() {
        let candidate = Candidate {
            requested_due_time: None,
            due_time: now() + Duration::days(1),
            reservation_time: now() - Duration::days(1),
            book_available: None,
        };
        assert!(validate_candidate(&candidate, now()).is_ok());
    }

    // =========================================================================
    // Creation
    // =========================================================================

    #[tokio::test]
    async fn test_create_rejects_past_due_time_without_writing() {
        // insert_active has no expectation: calling it would panic
        let service = service(store_with_book(true));

        let errors = field_errors(service.create(&request(1, now() - Duration::hours(1))).await);
        assert!(errors
            .get("due_time")
            .unwrap()
            .contains(&DUE_TIME_NOT_FUTURE.to_string()));
    }

    #[tokio::test]
    async fn test_create_rejects_due_time_before_reservation_time() {
        let service = service(store_with_book(true));
        let mut data = request(1, now() + Duration::days(1));
        data.reservation_time = Some(now() + Duration::days(2));

        let errors = field_errors(service.create(&data).await);
        assert_eq!(
            errors.get("due_time"),
            Some(&[DUE_TIME_NOT_AFTER_RESERVATION.to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unavailable_book() {
        let service = service(store_with_book(false));

        let errors = field_errors(service.create(&request(1, now() + Duration::days(7))).await);
        assert_eq!(errors.get("book"), Some(&[BOOK_NOT_AVAILABLE.to_string()][..]));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_book_and_user() {
        let mut store = MockReservationStore::new();
        store.expect_book_availability().returning(|_| Ok(None));
        store.expect_user_exists().returning(|_| Ok(false));
        let service = service(store);

        let errors = field_errors(service.create(&request(42, now() + Duration::days(7))).await);
        assert!(errors.get("book").is_some());
        assert!(errors.get("user").is_some());
    }

    #[tokio::test]
    async fn test_create_defaults_reservation_time_to_now() {
        let mut store = store_with_book(true);
        store
            .expect_insert_active()
            .withf(|new| new.reservation_time == now() && new.book_id == 3)
            .times(1)
            .returning(|new| {
                let mut reservation = stored(10, ReservationStatus::Active, new.book_id);
                reservation.reservation_time = new.reservation_time;
                reservation.due_time = new.due_time;
                Ok(reservation)
            });
        let service = service(store);

        let response = service.create(&request(3, now() + Duration::days(7))).await.unwrap();
        assert_eq!(response.status, ReservationStatus::Active);
        assert_eq!(response.reservation_time, now());
        assert!(!response.is_overdue);
    }

    #[tokio::test]
    async fn test_create_lost_race_reports_book_unavailable() {
        let mut store = store_with_book(true);
        store.expect_insert_active().returning(|_| {
            Err(AppError::InvalidFields(FieldErrors::single("book", BOOK_NOT_AVAILABLE)))
        });
        let service = service(store);

        let errors = field_errors(service.create(&request(1, now() + Duration::days(7))).await);
        assert!(errors.get("book").is_some());
    }

    // =========================================================================
    // Update
    // =========================================================================

    #[tokio::test]
    async fn test_update_same_book_skips_availability_check() {
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Active, 5)));
        store.expect_book_availability().never();
        store
            .expect_update()
            .withf(|_, changes| changes.book_id == 5)
            .returning(|id, changes| {
                let mut reservation = stored(id, ReservationStatus::Active, changes.book_id);
                reservation.due_time = changes.due_time;
                Ok(reservation)
            });
        let service = service(store);

        let data = UpdateReservation {
            book: Some(5),
            due_time: Some(now() + Duration::days(14)),
            reservation_time: None,
        };
        let response = service.update(1, &data).await.unwrap();
        assert_eq!(response.due_time, now() + Duration::days(14));
    }

    #[tokio::test]
    async fn test_update_to_unavailable_book_is_rejected() {
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Active, 5)));
        store.expect_book_availability().returning(|_| Ok(Some(false)));
        let service = service(store);

        let data = UpdateReservation { book: Some(6), ..Default::default() };
        let errors = field_errors(service.update(1, &data).await);
        assert_eq!(errors.get("book"), Some(&[BOOK_NOT_AVAILABLE.to_string()][..]));
    }

    #[tokio::test]
    async fn test_partial_update_checks_ordering_against_stored_values() {
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Active, 5)));
        let service = service(store);

        // Stored due time is now + 6 days
        let data = UpdateReservation {
            reservation_time: Some(now() + Duration::days(8)),
            ..Default::default()
        };
        let errors = field_errors(service.update(1, &data).await);
        assert_eq!(
            errors.get("due_time"),
            Some(&[DUE_TIME_NOT_AFTER_RESERVATION.to_string()][..])
        );
    }

    // =========================================================================
    // Return
    // =========================================================================

    #[tokio::test]
    async fn test_return_completes_with_current_time() {
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Active, 2)));
        store
            .expect_complete()
            .withf(|id, return_time| *id == 7 && *return_time == now())
            .times(1)
            .returning(|id, return_time| {
                let mut reservation = stored(id, ReservationStatus::Completed, 2);
                reservation.return_time = Some(return_time);
                Ok(reservation)
            });
        let service = service(store);

        let response = service.return_book(7, &ReturnReservation::default()).await.unwrap();
        assert_eq!(response.status, ReservationStatus::Completed);
        assert_eq!(response.return_time, Some(now()));
    }

    #[tokio::test]
    async fn test_return_uses_supplied_time() {
        let returned_at = now() - Duration::hours(3);
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Active, 2)));
        store
            .expect_complete()
            .withf(move |_, return_time| *return_time == returned_at)
            .returning(|id, return_time| {
                let mut reservation = stored(id, ReservationStatus::Completed, 2);
                reservation.return_time = Some(return_time);
                Ok(reservation)
            });
        let service = service(store);

        let data = ReturnReservation { return_time: Some(returned_at) };
        let response = service.return_book(7, &data).await.unwrap();
        assert_eq!(response.return_time, Some(returned_at));
    }

    #[tokio::test]
    async fn test_return_on_completed_reservation_is_rejected() {
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Completed, 2)));
        store.expect_complete().never();
        let service = service(store);

        let result = service.return_book(7, &ReturnReservation::default()).await;
        assert!(matches!(result, Err(AppError::BusinessRule(ref m)) if m == ALREADY_RETURNED));
    }

    // =========================================================================
    // Listing
    // =========================================================================

    #[tokio::test]
    async fn test_overdue_listing_filters_on_current_time() {
        let mut store = MockReservationStore::new();
        store
            .expect_list()
            .withf(|filter| filter.overdue_at == Some(now()))
            .returning(|_| {
                let mut reservation = stored(1, ReservationStatus::Active, 1);
                reservation.due_time = now() - Duration::days(1);
                Ok(vec![reservation])
            });
        let service = service(store);

        let query = ReservationQuery { overdue: Some("true".into()), ..Default::default() };
        let listed = service.list(&query).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_overdue);
    }

    // =========================================================================
    // Full lifecycle against an in-memory store
    // =========================================================================

    #[derive(Default)]
    struct InMemoryStore {
        books: Mutex<HashMap<i32, bool>>,
        reservations: Mutex<HashMap<i32, Reservation>>,
    }

    impl InMemoryStore {
        fn with_book(id: i32, available: bool) -> Self {
            Self::with_books(&[(id, available)])
        }

        fn with_books(books: &[(i32, bool)]) -> Self {
            let store = Self::default();
            store.books.lock().unwrap().extend(books.iter().copied());
            store
        }

        fn available(&self, book_id: i32) -> Option<bool> {
            self.books.lock().unwrap().get(&book_id).copied()
        }

        fn set_availability(&self, book_id: i32, available: bool) {
            self.books.lock().unwrap().insert(book_id, available);
        }
    }

    #[async_trait]
    impl ReservationStore for InMemoryStore {
        async fn get(&self, id: i32) -> AppResult<Reservation> {
            self.reservations
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
        }

        async fn list(&self, _filter: &ReservationFilter) -> AppResult<Vec<Reservation>> {
            Ok(self.reservations.lock().unwrap().values().cloned().collect())
        }

        async fn book_availability(&self, book_id: i32) -> AppResult<Option<bool>> {
            Ok(self.books.lock().unwrap().get(&book_id).copied())
        }

        async fn user_exists(&self, _user_id: i32) -> AppResult<bool> {
            Ok(true)
        }

        async fn insert_active(&self, new: &NewReservation) -> AppResult<Reservation> {
            let mut books = self.books.lock().unwrap();
            if books.get(&new.book_id) != Some(&true) {
                return Err(AppError::InvalidFields(FieldErrors::single("book", BOOK_NOT_AVAILABLE)));
            }
            books.insert(new.book_id, false);

            let mut reservations = self.reservations.lock().unwrap();
            let id = reservations.len() as i32 + 1;
            let reservation = Reservation {
                id,
                status: ReservationStatus::Active,
                reservation_time: new.reservation_time,
                due_time: new.due_time,
                return_time: None,
                book_id: new.book_id,
                user_id: new.user_id,
                created_at: new.reservation_time,
                updated_at: new.reservation_time,
            };
            reservations.insert(id, reservation.clone());
            Ok(reservation)
        }

        async fn update(&self, id: i32, changes: &ReservationChanges) -> AppResult<Reservation> {
            let mut books = self.books.lock().unwrap();
            let mut reservations = self.reservations.lock().unwrap();
            let reservation = reservations
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;

            if changes.book_id != reservation.book_id
                && reservation.status == ReservationStatus::Active
            {
                if books.get(&changes.book_id) != Some(&true) {
                    return Err(AppError::InvalidFields(FieldErrors::single("book", BOOK_NOT_AVAILABLE)));
                }
                books.insert(changes.book_id, false);
                books.insert(reservation.book_id, true);
            }

            reservation.book_id = changes.book_id;
            reservation.due_time = changes.due_time;
            reservation.reservation_time = changes.reservation_time;
            Ok(reservation.clone())
        }

        async fn complete(&self, id: i32, return_time: DateTime<Utc>) -> AppResult<Reservation> {
            let mut reservations = self.reservations.lock().unwrap();
            let reservation = reservations
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;
            if reservation.is_completed() {
                return Err(AppError::BusinessRule(ALREADY_RETURNED.to_string()));
            }
            reservation.status = ReservationStatus::Completed;
            reservation.return_time = Some(return_time);
            self.books.lock().unwrap().insert(reservation.book_id, true);
            Ok(reservation.clone())
        }

        async fn delete(&self, id: i32) -> AppResult<()> {
            let removed = self
                .reservations
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;
            if removed.status == ReservationStatus::Active {
                self.books.lock().unwrap().insert(removed.book_id, true);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dune_reserve_return_lifecycle() {
        let store = Arc::new(InMemoryStore::with_book(1, true));
        let service = ReservationsService::new(store.clone(), Arc::new(FixedClock(now())));

        let reserved = service.create(&request(1, now() + Duration::days(7))).await.unwrap();
        assert_eq!(reserved.status, ReservationStatus::Active);
        assert_eq!(store.book_availability(1).await.unwrap(), Some(false));

        // The book is taken now
        let errors = field_errors(service.create(&request(1, now() + Duration::days(7))).await);
        assert!(errors.get("book").is_some());

        let returned = service
            .return_book(reserved.id, &ReturnReservation::default())
            .await
            .unwrap();
        assert_eq!(returned.status, ReservationStatus::Completed);
        assert_eq!(returned.return_time, Some(now()));
        assert_eq!(store.book_availability(1).await.unwrap(), Some(true));

        // Make the book unavailable again to show the second return changes nothing
        store.set_availability(1, false);
        let second = service.return_book(reserved.id, &ReturnReservation::default()).await;
        assert!(matches!(second, Err(AppError::BusinessRule(_))));
        assert_eq!(store.book_availability(1).await.unwrap(), Some(false));
        assert_eq!(
            service.get(reserved.id).await.unwrap().status,
            ReservationStatus::Completed
        );
    }

    fn rebook(book: i32) -> UpdateReservation {
        UpdateReservation { book: Some(book), ..Default::default() }
    }

    #[tokio::test]
    async fn test_rebook_active_reservation_moves_availability() {
        let store = Arc::new(InMemoryStore::with_books(&[(1, true), (2, true), (3, false)]));
        let service = ReservationsService::new(store.clone(), Arc::new(FixedClock(now())));

        let reserved = service.create(&request(1, now() + Duration::days(7))).await.unwrap();

        let moved = service.update(reserved.id, &rebook(2)).await.unwrap();
        assert_eq!(moved.book, 2);
        assert_eq!(store.available(1), Some(true));
        assert_eq!(store.available(2), Some(false));

        // Book 3 is held elsewhere: nothing changes
        let errors = field_errors(service.update(reserved.id, &rebook(3)).await);
        assert_eq!(errors.get("book"), Some(&[BOOK_NOT_AVAILABLE.to_string()][..]));
        assert_eq!(service.get(reserved.id).await.unwrap().book, 2);
        assert_eq!(store.available(2), Some(false));
        assert_eq!(store.available(3), Some(false));
    }

    #[tokio::test]
    async fn test_rebook_completed_reservation_leaves_availability() {
        let store = Arc::new(InMemoryStore::with_books(&[(1, true), (2, true)]));
        let service = ReservationsService::new(store.clone(), Arc::new(FixedClock(now())));

        let reserved = service.create(&request(1, now() + Duration::days(7))).await.unwrap();
        service
            .return_book(reserved.id, &ReturnReservation::default())
            .await
            .unwrap();

        let moved = service.update(reserved.id, &rebook(2)).await.unwrap();
        assert_eq!(moved.book, 2);
        assert_eq!(store.available(1), Some(true));
        assert_eq!(store.available(2), Some(true));
    }

    #[tokio::test]
    async fn test_rebook_lost_race_reports_book_unavailable() {
        let mut store = MockReservationStore::new();
        store
            .expect_get()
            .returning(|id| Ok(stored(id, ReservationStatus::Active, 5)));
        store.expect_book_availability().returning(|_| Ok(Some(true)));
        // Taken between the availability read and the conditional write
        store.expect_update().times(1).returning(|_, _| {
            Err(AppError::InvalidFields(FieldErrors::single("book", BOOK_NOT_AVAILABLE)))
        });
        let service = service(store);

        let errors = field_errors(service.update(1, &rebook(6)).await);
        assert_eq!(errors.get("book"), Some(&[BOOK_NOT_AVAILABLE.to_string()][..]));
    }

    #[tokio::test]
    async fn test_delete_active_reservation_releases_book() {
        let store = Arc::new(InMemoryStore::with_book(1, true));
        let service = ReservationsService::new(store.clone(), Arc::new(FixedClock(now())));

        let reserved = service.create(&request(1, now() + Duration::days(7))).await.unwrap();
        assert_eq!(store.available(1), Some(false));

        service.delete(reserved.id).await.unwrap();
        assert_eq!(store.available(1), Some(true));
        assert!(matches!(service.get(reserved.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_completed_reservation_keeps_current_holder() {
        let store = Arc::new(InMemoryStore::with_book(1, true));
        let service = ReservationsService::new(store.clone(), Arc::new(FixedClock(now())));

        let first = service.create(&request(1, now() + Duration::days(7))).await.unwrap();
        service
            .return_book(first.id, &ReturnReservation::default())
            .await
            .unwrap();
        service.create(&request(1, now() + Duration::days(7))).await.unwrap();

        service.delete(first.id).await.unwrap();
        assert_eq!(store.available(1), Some(false));
    }
}
