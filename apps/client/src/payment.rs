//! UPI payment flow for the paid resume-creation service.
//!
//! One state machine per attempt. The platform branch is decided once from
//! an explicit hint, and payment verification sits behind a trait: the
//! default `SelfAttestation` wraps the host's yes/no dialog (the original
//! honor-system behavior), while a server-verified implementation can be
//! slotted in without touching the machine. Profile submission happens only
//! on an affirmative verification.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::http::ApiClient;

/// Fixed price of the resume-creation service.
pub const PAYMENT_AMOUNT_INR: u32 = 199;

/// How long the mobile path waits after handing off the deep link before
/// asking for confirmation — enough for the UPI app round trip, usually.
pub const MOBILE_CONFIRMATION_DELAY: Duration = Duration::from_secs(6);

const CONFIRM_PROMPT: &str = "Have you completed the INR 199 payment in your UPI app? \
                              Confirm only if the payment was successful.";

/// Supplied by the hosting environment once per session; never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformHint {
    Mobile,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Idle,
    /// Deep link handed to the host; waiting out the app round trip.
    AwaitingMobileConfirmation,
    /// QR payload handed to the host; waiting for the manual trigger.
    AwaitingDesktopConfirmation,
    Confirmed,
    Submitted,
    Abandoned,
}

/// How one attempt resolved, with the user-facing status line.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentResolution {
    Submitted { status: String },
    SubmitFailed { status: String },
    Abandoned { status: String },
}

/// The profile submitted for manual resume creation. Empty optional fields
/// are omitted from the outgoing form.
#[derive(Debug, Clone, Default)]
pub struct PaymentProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// UPI-linked mobile number; entry guard requires at least 10 digits.
    pub sender_number: String,
    pub role: String,
    pub skills: String,
    pub projects: String,
    pub achievements: String,
    /// (file name, image bytes)
    pub payment_proof: Option<(String, Vec<u8>)>,
}

#[derive(Debug, Clone)]
pub struct PayeeDetails {
    /// UPI VPA, e.g. `screening@upi`.
    pub address: String,
    pub display_name: String,
}

/// Builds the `upi://pay` URI both branches share. The mobile path launches
/// it; the desktop path renders it as a QR payload.
pub fn build_upi_uri(payee: &PayeeDetails, sender_number: &str) -> String {
    let note = format!("Resume Creation Payment ({sender_number})");
    format!(
        "upi://pay?pa={}&pn={}&am={PAYMENT_AMOUNT_INR}&cu=INR&tn={}",
        payee.address,
        urlencoding::encode(&payee.display_name),
        urlencoding::encode(&note),
    )
}

/// Answers whether the payment actually happened.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// The honor-system verifier: defers entirely to the host's blocking
/// yes/no dialog. No independent verification — see the module docs.
pub struct SelfAttestation<F>(pub F)
where
    F: Fn(&str) -> bool + Send + Sync;

#[async_trait]
impl<F> PaymentVerifier for SelfAttestation<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn confirm(&self, prompt: &str) -> bool {
        (self.0)(prompt)
    }
}

pub struct PaymentFlow {
    api: ApiClient,
    payee: PayeeDetails,
    state: PaymentState,
    upi_uri: Option<String>,
    mobile_delay: Duration,
}

impl PaymentFlow {
    pub fn new(api: ApiClient, payee: PayeeDetails) -> Self {
        Self {
            api,
            payee,
            state: PaymentState::Idle,
            upi_uri: None,
            mobile_delay: MOBILE_CONFIRMATION_DELAY,
        }
    }

    /// Overrides the mobile-path delay (tests; embedded hosts with their
    /// own pacing).
    pub fn with_mobile_delay(mut self, delay: Duration) -> Self {
        self.mobile_delay = delay;
        self
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// The URI for the host to launch (mobile) or render as a QR (desktop).
    /// Present once `begin` has succeeded.
    pub fn upi_uri(&self) -> Option<&str> {
        self.upi_uri.as_deref()
    }

    /// Starts an attempt. The platform branch is decided here, once.
    pub fn begin(&mut self, profile: &PaymentProfile, platform: PlatformHint) -> Result<&str> {
        if self.state != PaymentState::Idle {
            return Err(Error::Validation(
                "A payment attempt is already in progress.".to_string(),
            ));
        }
        let digits = profile
            .sender_number
            .chars()
            .filter(char::is_ascii_digit)
            .count();
        if digits < 10 {
            return Err(Error::Validation(
                "Enter your UPI-linked mobile number before proceeding.".to_string(),
            ));
        }

        self.upi_uri = Some(build_upi_uri(&self.payee, profile.sender_number.trim()));
        self.state = match platform {
            PlatformHint::Mobile => PaymentState::AwaitingMobileConfirmation,
            PlatformHint::Desktop => PaymentState::AwaitingDesktopConfirmation,
        };
        Ok(self.upi_uri.as_deref().unwrap_or_default())
    }

    /// Consults the verifier and, on an affirmative answer only, submits the
    /// profile. A declined verification abandons the attempt; there is no
    /// separate "payment failed" state to distinguish it with.
    pub async fn confirm_and_submit(
        &mut self,
        profile: &PaymentProfile,
        verifier: &dyn PaymentVerifier,
    ) -> Result<PaymentResolution> {
        match self.state {
            PaymentState::AwaitingMobileConfirmation => {
                tokio::time::sleep(self.mobile_delay).await;
            }
            PaymentState::AwaitingDesktopConfirmation => {}
            _ => {
                return Err(Error::Validation(
                    "No payment is awaiting confirmation.".to_string(),
                ))
            }
        }

        if !verifier.confirm(CONFIRM_PROMPT).await {
            self.state = PaymentState::Abandoned;
            return Ok(PaymentResolution::Abandoned {
                status: "Payment not confirmed. Please complete payment first.".to_string(),
            });
        }

        self.state = PaymentState::Confirmed;

        match self.send_details(profile).await {
            Ok(()) => {
                self.state = PaymentState::Submitted;
                Ok(PaymentResolution::Submitted {
                    status: "Details sent successfully! You'll receive your resume within 3-4 days."
                        .to_string(),
                })
            }
            Err(Error::Network(e)) => {
                tracing::warn!("Profile submission failed to reach the server: {e}");
                Ok(PaymentResolution::SubmitFailed {
                    status: "Failed to contact server.".to_string(),
                })
            }
            Err(e) => {
                tracing::warn!("Profile submission rejected: {e}");
                Ok(PaymentResolution::SubmitFailed {
                    status: "Error sending details.".to_string(),
                })
            }
        }
    }

    /// Multipart POST of every non-empty text field plus the optional proof
    /// image. Field names are the backend contract.
    async fn send_details(&self, profile: &PaymentProfile) -> Result<()> {
        let mut form = Form::new();
        for (name, value) in [
            ("name", &profile.name),
            ("email", &profile.email),
            ("phone", &profile.phone),
            ("senderNumber", &profile.sender_number),
            ("role", &profile.role),
            ("skills", &profile.skills),
            ("projects", &profile.projects),
            ("achievements", &profile.achievements),
        ] {
            if !value.is_empty() {
                form = form.text(name, value.clone());
            }
        }
        if let Some((file_name, bytes)) = &profile.payment_proof {
            form = form.part(
                "paymentProof",
                Part::bytes(bytes.clone()).file_name(file_name.clone()),
            );
        }

        let response = self
            .api
            .http
            .post(self.api.url("/api/save"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(crate::http::error_from_response(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payee() -> PayeeDetails {
        PayeeDetails {
            address: "screening@upi".to_string(),
            display_name: "AI Resume Builder".to_string(),
        }
    }

    fn profile() -> PaymentProfile {
        PaymentProfile {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            sender_number: "9876543210".to_string(),
            role: "Frontend Engineer".to_string(),
            ..PaymentProfile::default()
        }
    }

    #[test]
    fn test_upi_uri_shape() {
        let uri = build_upi_uri(&payee(), "9876543210");
        assert!(uri.starts_with("upi://pay?pa=screening@upi"));
        assert!(uri.contains("pn=AI%20Resume%20Builder"));
        assert!(uri.contains("am=199"));
        assert!(uri.contains("cu=INR"));
        assert!(uri.contains("9876543210"));
    }

    #[test]
    fn test_begin_requires_ten_digit_sender_number() {
        let mut flow = PaymentFlow::new(ApiClient::new("http://localhost:1"), payee());
        let mut short = profile();
        short.sender_number = "98765".to_string();
        assert!(matches!(
            flow.begin(&short, PlatformHint::Mobile),
            Err(Error::Validation(_))
        ));
        assert_eq!(flow.state(), PaymentState::Idle);
        assert!(flow.upi_uri().is_none());
    }

    #[test]
    fn test_begin_branches_on_platform_hint_once() {
        let mut mobile = PaymentFlow::new(ApiClient::new("http://localhost:1"), payee());
        mobile.begin(&profile(), PlatformHint::Mobile).unwrap();
        assert_eq!(mobile.state(), PaymentState::AwaitingMobileConfirmation);

        let mut desktop = PaymentFlow::new(ApiClient::new("http://localhost:1"), payee());
        desktop.begin(&profile(), PlatformHint::Desktop).unwrap();
        assert_eq!(desktop.state(), PaymentState::AwaitingDesktopConfirmation);

        // A second begin on the same attempt is rejected.
        assert!(desktop.begin(&profile(), PlatformHint::Mobile).is_err());
    }

    #[tokio::test]
    async fn test_declined_attestation_never_submits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/save"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut flow = PaymentFlow::new(ApiClient::new(server.uri()), payee())
            .with_mobile_delay(Duration::ZERO);
        flow.begin(&profile(), PlatformHint::Mobile).unwrap();

        let verifier = SelfAttestation(|_: &str| false);
        let resolution = flow
            .confirm_and_submit(&profile(), &verifier)
            .await
            .unwrap();
        assert!(matches!(resolution, PaymentResolution::Abandoned { .. }));
        assert_eq!(flow.state(), PaymentState::Abandoned);
    }

    #[tokio::test]
    async fn test_affirmed_attestation_submits_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/save"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "msg": "Details received successfully, proof attached."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut flow = PaymentFlow::new(ApiClient::new(server.uri()), payee())
            .with_mobile_delay(Duration::ZERO);
        flow.begin(&profile(), PlatformHint::Mobile).unwrap();

        let verifier = SelfAttestation(|_: &str| true);
        let resolution = flow
            .confirm_and_submit(&profile(), &verifier)
            .await
            .unwrap();
        assert!(matches!(resolution, PaymentResolution::Submitted { .. }));
        assert_eq!(flow.state(), PaymentState::Submitted);
    }

    #[tokio::test]
    async fn test_desktop_path_submits_without_delay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/save"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut flow = PaymentFlow::new(ApiClient::new(server.uri()), payee());
        let uri = flow.begin(&profile(), PlatformHint::Desktop).unwrap().to_string();
        assert!(uri.starts_with("upi://pay?"));

        let verifier = SelfAttestation(|_: &str| true);
        let resolution = flow
            .confirm_and_submit(&profile(), &verifier)
            .await
            .unwrap();
        assert!(matches!(resolution, PaymentResolution::Submitted { .. }));
    }

    #[tokio::test]
    async fn test_confirm_without_begin_is_rejected() {
        let mut flow = PaymentFlow::new(ApiClient::new("http://localhost:1"), payee());
        let verifier = SelfAttestation(|_: &str| true);
        assert!(flow.confirm_and_submit(&profile(), &verifier).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_reduces_to_status_string() {
        let mut flow = PaymentFlow::new(ApiClient::new("http://127.0.0.1:1"), payee())
            .with_mobile_delay(Duration::ZERO);
        flow.begin(&profile(), PlatformHint::Mobile).unwrap();

        let verifier = SelfAttestation(|_: &str| true);
        let resolution = flow
            .confirm_and_submit(&profile(), &verifier)
            .await
            .unwrap();
        match resolution {
            PaymentResolution::SubmitFailed { status } => {
                assert_eq!(status, "Failed to contact server.");
            }
            other => panic!("expected SubmitFailed, got {other:?}"),
        }
        // Confirmed but not submitted — the attempt did not complete.
        assert_eq!(flow.state(), PaymentState::Confirmed);
    }
}
