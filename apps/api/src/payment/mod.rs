//! Paid resume-creation intake. Requests arrive as multipart profiles with an
//! optional payment-proof image and are handed to an `AdminNotifier` for
//! human follow-up — nothing here verifies the payment itself.

pub mod handlers;

use async_trait::async_trait;
use bytes::Bytes;

/// One resume-creation request, as submitted after the payment flow.
#[derive(Debug, Clone, Default)]
pub struct ResumeRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// UPI-linked mobile number the payer sent from.
    pub sender_number: String,
    pub role: String,
    pub skills: String,
    pub projects: String,
    pub achievements: String,
    pub proof: Option<ProofImage>,
}

#[derive(Debug, Clone)]
pub struct ProofImage {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Outbound admin notifications. Deployments implement this against their
/// mail or messaging infrastructure; the default renders and logs.
#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn resume_request(
        &self,
        payee_address: &str,
        request: &ResumeRequest,
    ) -> anyhow::Result<()>;

    async fn candidate_id_issued(&self, email: &str, candidate_id: &str) -> anyhow::Result<()>;
}

pub struct LogNotifier;

#[async_trait]
impl AdminNotifier for LogNotifier {
    async fn resume_request(
        &self,
        payee_address: &str,
        request: &ResumeRequest,
    ) -> anyhow::Result<()> {
        tracing::info!(
            "New resume request (pending verification):\n{}",
            render_resume_request(payee_address, request)
        );
        Ok(())
    }

    async fn candidate_id_issued(&self, email: &str, candidate_id: &str) -> anyhow::Result<()> {
        tracing::info!("Issued candidate ID {candidate_id} to {email}");
        Ok(())
    }
}

/// Plain-text notification body for a resume request.
pub fn render_resume_request(payee_address: &str, request: &ResumeRequest) -> String {
    let proof_note = match &request.proof {
        Some(proof) => format!("Payment screenshot attached: {}", proof.file_name),
        None => "No payment screenshot uploaded.".to_string(),
    };
    format!(
        "New Resume Request Received (Pending Verification)\n\
         Payment Receiver UPI: {payee_address}\n\
         Sender UPI Mobile Number: {sender}\n\
         ---\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Desired Role: {role}\n\
         Skills:\n{skills}\n\
         Projects:\n{projects}\n\
         Achievements:\n{achievements}\n\
         ---\n\
         {proof_note}",
        sender = request.sender_number,
        name = request.name,
        email = request.email,
        phone = request.phone,
        role = request.role,
        skills = request.skills,
        projects = request.projects,
        achievements = request.achievements,
    )
}
