//! Checkout Session
//!
//! Client-local state machine driving one checkout attempt:
//!
//! ```text
//! Uninitialized ──client_ready(Ok)──▶ WaitingForUser ──finish_submit(succeeded)──▶ Succeeded
//!       │                               │    ▲
//!       └──client_ready(Err)──▶ Failed  └────┘ attach_intent / submit errors
//! ```
//!
//! `loading` and `error` are orthogonal to the status. The session owns the
//! SDK handles; they leave it only as clones inside a [`PendingConfirm`].

use serde::{Deserialize, Serialize};

use crate::collaborator::{
    Appearance, ConfirmOutcome, FieldKind, MountTarget, PaymentClient, PaymentElementOptions,
    PaymentElements, PaymentField, RedirectPolicy,
};
use crate::error::{CheckoutError, Result, SdkError};
use crate::intent::{IntentStatus, PaymentIntentRecord};
use crate::view::CheckoutView;

type FieldOf<C> = <<C as PaymentClient>::Elements as PaymentElements>::Field;

/// Checkout lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    #[default]
    Uninitialized,
    WaitingForUser,
    Succeeded,
    /// Payment library never became ready
    Failed,
}

/// In-memory checkout state for one mounted component
pub struct CheckoutSession<C: PaymentClient> {
    client: Option<C>,
    elements: Option<C::Elements>,
    field: Option<FieldOf<C>>,
    appearance: Appearance,
    element_options: PaymentElementOptions,
    status: CheckoutStatus,
    error: Option<CheckoutError>,
    loading: bool,
}

impl<C: PaymentClient> Default for CheckoutSession<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PaymentClient> CheckoutSession<C> {
    pub fn new() -> Self {
        Self::with_options(Appearance::default(), PaymentElementOptions::default())
    }

    /// Create with a custom appearance and payment field options
    pub fn with_options(appearance: Appearance, element_options: PaymentElementOptions) -> Self {
        Self {
            client: None,
            elements: None,
            field: None,
            appearance,
            element_options,
            status: CheckoutStatus::Uninitialized,
            error: None,
            loading: false,
        }
    }

    pub fn status(&self) -> CheckoutStatus {
        self.status
    }

    pub fn error(&self) -> Option<&CheckoutError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the hosted form has been mounted
    pub fn is_mounted(&self) -> bool {
        self.field.is_some()
    }

    /// Record the result of loading the payment library
    pub fn client_ready(&mut self, result: std::result::Result<C, SdkError>) {
        if self.status != CheckoutStatus::Uninitialized {
            tracing::debug!(status = ?self.status, "Payment client already resolved");
            return;
        }

        match result {
            Ok(client) => {
                self.client = Some(client);
                self.status = CheckoutStatus::WaitingForUser;
                tracing::debug!("Payment client ready");
            }
            Err(err) => {
                tracing::error!(error = %err, "Payment client failed to load");
                self.error = Some(CheckoutError::Initialization(err.message));
                self.status = CheckoutStatus::Failed;
            }
        }
    }

    /// Bind the hosted form to a freshly created intent and mount it
    ///
    /// A missing secret, client handle or target leaves the session waiting
    /// with a setup error.
    pub fn attach_intent(
        &mut self,
        intent: Result<PaymentIntentRecord>,
        target: Option<&MountTarget<C>>,
    ) {
        if matches!(self.status, CheckoutStatus::Failed | CheckoutStatus::Succeeded) {
            tracing::debug!(status = ?self.status, "Ignoring intent for inactive checkout");
            return;
        }
        if self.elements.is_some() {
            tracing::debug!("Hosted form already mounted");
            return;
        }

        let record = match intent {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "Intent request failed");
                self.error = Some(err);
                return;
            }
        };

        match self.build_form(&record, target) {
            Ok((elements, field)) => {
                self.elements = Some(elements);
                self.field = Some(field);
                tracing::info!(intent_id = %record.id, "Hosted payment form mounted");
            }
            Err(err) => {
                tracing::warn!(
                    intent_id = %record.id,
                    has_secret = record.secret().is_some(),
                    has_client = self.client.is_some(),
                    has_target = target.is_some(),
                    kind = err.kind(),
                    error = %err,
                    "Hosted form setup failed"
                );
                self.error = Some(err);
            }
        }
    }

    fn build_form(
        &self,
        record: &PaymentIntentRecord,
        target: Option<&MountTarget<C>>,
    ) -> Result<(C::Elements, FieldOf<C>)> {
        let (Some(secret), Some(client), Some(target)) =
            (record.secret(), self.client.as_ref(), target)
        else {
            return Err(CheckoutError::setup());
        };

        let elements = client
            .elements(&self.appearance, secret)
            .map_err(|e| CheckoutError::Setup(e.message))?;
        let field = elements
            .create(FieldKind::Payment, &self.element_options)
            .map_err(|e| CheckoutError::Setup(e.message))?;
        field
            .mount(target)
            .map_err(|e| CheckoutError::Setup(e.message))?;

        Ok((elements, field))
    }

    /// Start a submission
    ///
    /// Returns `None` when the checkout is not waiting for the user, when a
    /// submission is already in flight, or when the handles are missing (the
    /// last case sets [`CheckoutError::NotReady`]).
    pub fn begin_submit(&mut self) -> Option<PendingConfirm<C>> {
        if self.status != CheckoutStatus::WaitingForUser {
            tracing::debug!(status = ?self.status, "Submit ignored");
            return None;
        }
        if self.loading {
            tracing::debug!("Submission already in flight");
            return None;
        }

        self.loading = true;

        if let (Some(client), Some(elements)) = (&self.client, &self.elements) {
            Some(PendingConfirm {
                client: client.clone(),
                elements: elements.clone(),
            })
        } else {
            tracing::warn!("Submit before payment form was ready");
            self.error = Some(CheckoutError::NotReady);
            self.loading = false;
            None
        }
    }

    /// Apply the collaborator's confirm result
    pub fn finish_submit(&mut self, outcome: ConfirmOutcome) {
        let status = outcome.status();

        if let Some(err) = outcome.error {
            tracing::info!(code = ?err.code, message = %err.message, "Payment not confirmed");
            self.error = Some(CheckoutError::Collaborator(err));
        }

        if status == Some(IntentStatus::Succeeded) {
            self.error = None;
            self.status = CheckoutStatus::Succeeded;
            tracing::info!("Payment succeeded");
        } else if let Some(status) = status {
            tracing::debug!(%status, "Payment confirmed without success");
        }

        self.loading = false;
    }

    /// Run a whole submission against the owned handles
    pub async fn submit(&mut self) {
        if let Some(pending) = self.begin_submit() {
            let outcome = pending.confirm().await;
            self.finish_submit(outcome);
        }
    }

    /// What the component should render right now
    pub fn view(&self) -> CheckoutView {
        CheckoutView::derive(self.status, self.error.as_ref(), self.loading)
    }
}

/// Handles needed to confirm one submission
pub struct PendingConfirm<C: PaymentClient> {
    client: C,
    elements: C::Elements,
}

impl<C: PaymentClient> PendingConfirm<C> {
    pub async fn confirm(self) -> ConfirmOutcome {
        self.client
            .confirm_payment(&self.elements, RedirectPolicy::IfRequired)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ClientSecret;
    use crate::view::ViewBody;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        secrets: RefCell<Vec<String>>,
        mounts: RefCell<Vec<String>>,
        confirms: Cell<usize>,
        redirects: RefCell<Vec<RedirectPolicy>>,
    }

    #[derive(Clone, Default)]
    struct MockClient {
        calls: Rc<Calls>,
        outcome: Rc<RefCell<ConfirmOutcome>>,
    }

    #[derive(Clone)]
    struct MockElements {
        calls: Rc<Calls>,
    }

    struct MockField {
        calls: Rc<Calls>,
    }

    #[async_trait(?Send)]
    impl PaymentClient for MockClient {
        type Elements = MockElements;

        fn elements(
            &self,
            _appearance: &Appearance,
            client_secret: &ClientSecret,
        ) -> std::result::Result<MockElements, SdkError> {
            self.calls
                .secrets
                .borrow_mut()
                .push(client_secret.as_str().to_string());
            Ok(MockElements {
                calls: self.calls.clone(),
            })
        }

        async fn confirm_payment(
            &self,
            _elements: &MockElements,
            redirect: RedirectPolicy,
        ) -> ConfirmOutcome {
            self.calls.confirms.set(self.calls.confirms.get() + 1);
            self.calls.redirects.borrow_mut().push(redirect);
            self.outcome.borrow().clone()
        }
    }

    impl PaymentElements for MockElements {
        type Field = MockField;

        fn create(
            &self,
            kind: FieldKind,
            _options: &PaymentElementOptions,
        ) -> std::result::Result<MockField, SdkError> {
            assert_eq!(kind, FieldKind::Payment);
            Ok(MockField {
                calls: self.calls.clone(),
            })
        }
    }

    impl PaymentField for MockField {
        type Target = str;

        fn mount(&self, target: &str) -> std::result::Result<(), SdkError> {
            self.calls.mounts.borrow_mut().push(target.to_string());
            Ok(())
        }
    }

    fn record(secret: Option<&str>) -> PaymentIntentRecord {
        let mut raw = json!({ "id": "pi_123", "status": "requires_payment_method", "amount": 999 });
        if let Some(secret) = secret {
            raw["client_secret"] = json!(secret);
        }
        serde_json::from_value(raw).unwrap()
    }

    fn ready_session(client: &MockClient) -> CheckoutSession<MockClient> {
        let mut session = CheckoutSession::new();
        session.client_ready(Ok(client.clone()));
        session.attach_intent(Ok(record(Some("pi_123_secret_abc"))), Some("#checkout"));
        session
    }

    #[test]
    fn test_client_ready_waits_for_user() {
        let mut session = CheckoutSession::<MockClient>::new();
        assert_eq!(session.status(), CheckoutStatus::Uninitialized);
        assert_eq!(session.view().body, ViewBody::Blank);

        session.client_ready(Ok(MockClient::default()));
        assert_eq!(session.status(), CheckoutStatus::WaitingForUser);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_client_load_failure_is_handled() {
        let mut session = CheckoutSession::<MockClient>::new();
        session.client_ready(Err(SdkError::new("script blocked")));

        assert_eq!(session.status(), CheckoutStatus::Failed);
        assert!(matches!(session.error(), Some(CheckoutError::Initialization(_))));
        assert!(matches!(session.view().body, ViewBody::Unavailable { .. }));

        // no way back into the flow
        session.attach_intent(Ok(record(Some("pi_123_secret_abc"))), Some("#checkout"));
        assert!(!session.is_mounted());
    }

    #[test]
    fn test_mounts_once_with_secret() {
        let client = MockClient::default();
        let mut session = ready_session(&client);

        assert!(session.is_mounted());
        assert_eq!(session.status(), CheckoutStatus::WaitingForUser);
        assert!(session.error().is_none());
        assert_eq!(*client.calls.secrets.borrow(), vec!["pi_123_secret_abc"]);
        assert_eq!(*client.calls.mounts.borrow(), vec!["#checkout"]);

        session.attach_intent(Ok(record(Some("pi_456_secret_def"))), Some("#checkout"));
        assert_eq!(client.calls.mounts.borrow().len(), 1);
    }

    #[test]
    fn test_missing_secret_is_setup_failure() {
        let client = MockClient::default();
        let mut session = CheckoutSession::new();
        session.client_ready(Ok(client.clone()));
        session.attach_intent(Ok(record(None)), Some("#checkout"));

        assert_eq!(session.status(), CheckoutStatus::WaitingForUser);
        assert_eq!(session.error(), Some(&CheckoutError::setup()));
        assert!(client.calls.mounts.borrow().is_empty());
        assert!(client.calls.secrets.borrow().is_empty());
    }

    #[test]
    fn test_missing_target_is_setup_failure() {
        let client = MockClient::default();
        let mut session = CheckoutSession::new();
        session.client_ready(Ok(client.clone()));
        session.attach_intent(Ok(record(Some("pi_123_secret_abc"))), None);

        assert_eq!(session.error(), Some(&CheckoutError::setup()));
        assert!(!session.is_mounted());
        assert_eq!(
            session.view().body,
            ViewBody::Form {
                error: Some("Element Setup failed".into()),
                submit_enabled: true,
            }
        );
    }

    #[test]
    fn test_intent_fetch_error_is_shown() {
        let mut session = CheckoutSession::new();
        session.client_ready(Ok(MockClient::default()));
        session.attach_intent(Err(CheckoutError::Network("HTTP 502".into())), Some("#checkout"));

        assert_eq!(session.status(), CheckoutStatus::WaitingForUser);
        assert_eq!(session.error().map(ToString::to_string).as_deref(), Some("HTTP 502"));
    }

    #[tokio::test]
    async fn test_submit_before_ready_is_noop() {
        let client = MockClient::default();
        let mut session = CheckoutSession::<MockClient>::new();
        session.submit().await;

        assert_eq!(session.status(), CheckoutStatus::Uninitialized);
        assert!(!session.is_loading());
        assert!(session.error().is_none());
        assert_eq!(client.calls.confirms.get(), 0);
    }

    #[tokio::test]
    async fn test_submit_succeeds() {
        let client = MockClient::default();
        *client.outcome.borrow_mut() = ConfirmOutcome::succeeded();
        let mut session = ready_session(&client);

        session.submit().await;

        assert_eq!(session.status(), CheckoutStatus::Succeeded);
        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert_eq!(*client.calls.redirects.borrow(), vec![RedirectPolicy::IfRequired]);
        assert_eq!(session.view().body, ViewBody::Success);

        // terminal
        session.submit().await;
        assert_eq!(client.calls.confirms.get(), 1);
    }

    #[tokio::test]
    async fn test_submit_declined_allows_retry() {
        let client = MockClient::default();
        *client.outcome.borrow_mut() = ConfirmOutcome::failed(SdkError::new("card_declined"));
        let mut session = ready_session(&client);

        session.submit().await;

        assert_eq!(session.status(), CheckoutStatus::WaitingForUser);
        assert!(!session.is_loading());
        match session.error() {
            Some(CheckoutError::Collaborator(err)) => assert_eq!(err.message, "card_declined"),
            other => panic!("unexpected error: {other:?}"),
        }

        *client.outcome.borrow_mut() = ConfirmOutcome::succeeded();
        session.submit().await;
        assert_eq!(session.status(), CheckoutStatus::Succeeded);
        assert!(session.error().is_none());
        assert_eq!(client.calls.confirms.get(), 2);
    }

    #[tokio::test]
    async fn test_success_status_clears_reported_error() {
        let client = MockClient::default();
        *client.outcome.borrow_mut() = ConfirmOutcome {
            error: Some(SdkError::new("authentication_required")),
            ..ConfirmOutcome::succeeded()
        };
        let mut session = ready_session(&client);

        session.submit().await;

        assert_eq!(session.status(), CheckoutStatus::Succeeded);
        assert_eq!(session.error(), None);
        assert!(!session.is_loading());
        assert_eq!(session.view().body, ViewBody::Success);
    }

    #[tokio::test]
    async fn test_non_success_status_without_error() {
        let client = MockClient::default();
        *client.outcome.borrow_mut() = ConfirmOutcome::with_status(IntentStatus::Processing);
        let mut session = ready_session(&client);

        session.submit().await;

        assert_eq!(session.status(), CheckoutStatus::WaitingForUser);
        assert!(session.error().is_none());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_duplicate_submit_is_rejected_while_in_flight() {
        let client = MockClient::default();
        *client.outcome.borrow_mut() = ConfirmOutcome::succeeded();
        let mut session = ready_session(&client);

        let pending = session.begin_submit().expect("first submission starts");
        assert!(session.is_loading());
        assert!(session.view().processing);
        assert!(session.begin_submit().is_none());

        let outcome = pending.confirm().await;
        session.finish_submit(outcome);

        assert_eq!(client.calls.confirms.get(), 1);
        assert_eq!(session.status(), CheckoutStatus::Succeeded);
    }

    #[test]
    fn test_submit_without_form_reports_not_ready() {
        let client = MockClient::default();
        let mut session = CheckoutSession::new();
        session.client_ready(Ok(client.clone()));
        session.attach_intent(Ok(record(None)), Some("#checkout"));

        assert!(session.begin_submit().is_none());
        assert_eq!(session.error(), Some(&CheckoutError::NotReady));
        assert!(!session.is_loading());
        assert_eq!(client.calls.confirms.get(), 0);
    }
}
