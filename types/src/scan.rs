//! Scan input: the wire request and the validated, immutable payload.

use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;
use crate::product::ProductId;
use crate::TypesError;

/// Maximum accepted length of the free-text `location` and `notes` fields.
pub const MAX_FREE_TEXT_LEN: usize = 1024;

/// A verification request as received from a caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerificationRequest {
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub claimed_qr_hash: String,
    #[serde(default)]
    pub claimed_content_hash: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The validated input of one verification attempt.
///
/// Built once by [`ScanPayload::from_request`] and never mutated. The claimed
/// QR hash is kept verbatim (apart from surrounding whitespace) so that a
/// malformed claim can be reported by the format check instead of being
/// rejected up front.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPayload {
    product_id: ProductId,
    claimed_qr_hash: String,
    claimed_content_hash: Option<ContentHash>,
    location: Option<String>,
    notes: Option<String>,
}

impl ScanPayload {
    /// Shape validation. Only a missing product id (or id zero) and oversized
    /// free text are rejected; everything else is left to the evidence checks.
    pub fn from_request(request: VerificationRequest) -> Result<Self, TypesError> {
        let product_id = match request.product_id {
            Some(id) if id > 0 => ProductId::new(id),
            _ => return Err(TypesError::MissingProductId),
        };

        let location = normalize_free_text("location", request.location)?;
        let notes = normalize_free_text("notes", request.notes)?;
        let claimed_content_hash = request
            .claimed_content_hash
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .map(ContentHash::new);

        Ok(Self {
            product_id,
            claimed_qr_hash: request.claimed_qr_hash.trim().to_string(),
            claimed_content_hash,
            location,
            notes,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn claimed_qr_hash(&self) -> &str {
        &self.claimed_qr_hash
    }

    pub fn claimed_content_hash(&self) -> Option<&ContentHash> {
        self.claimed_content_hash.as_ref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

fn normalize_free_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, TypesError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.len() > MAX_FREE_TEXT_LEN {
        return Err(TypesError::InvalidField {
            field,
            reason: format!("longer than {MAX_FREE_TEXT_LEN} bytes"),
        });
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
