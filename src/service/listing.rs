use crate::AppContext;
use crate::api::PhotoUpload;
use crate::error::app_error::AppError;
use crate::models::listing::{CreatedResponse, CropListingForm, DemandForm, ListingForm};
use crate::models::profile::Identity;
use crate::models::role::Role;
use crate::models::route::Route;
use crate::models::session::Session;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub route: Route,
    pub created: CreatedResponse,
}

/// Submit control for one listing form.
///
/// `Idle -> Submitting -> Idle`. While a submission is in flight a second one
/// is refused before any request is built. Failures leave the caller's form
/// untouched so the user can retry by hand.
#[derive(Debug, Default)]
pub struct ListingSubmitter {
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ListingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        if self.in_flight.load(Ordering::Acquire) {
            SubmissionState::Submitting
        } else {
            SubmissionState::Idle
        }
    }

    fn begin(&self) -> Result<InFlight<'_>, AppError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| AppError::SubmissionInFlight)
    }

    pub async fn submit_demand(&self, ctx: &AppContext, session: &Session, buyer: &Identity, form: &DemandForm) -> Result<Submitted, AppError> {
        ensure_owner(buyer, Role::Buyer)?;
        let request = form.into_request(&buyer.id)?;
        let _in_flight = self.begin()?;

        let created = ctx.api.add_demand(&session.token, &request).await.inspect_err(|e| {
            warn!(buyer_id = %buyer.id, error = %e, "demand submission failed");
        })?;
        info!(buyer_id = %buyer.id, crop_id = %request.crop_id, "demand posted");

        Ok(Submitted {
            route: Route::Dashboard(Role::Buyer),
            created,
        })
    }

    pub async fn submit_crop_listing(
        &self,
        ctx: &AppContext,
        session: &Session,
        farmer: &Identity,
        form: &CropListingForm,
    ) -> Result<Submitted, AppError> {
        ensure_owner(farmer, Role::Farmer)?;
        let request = form.into_request(&farmer.id)?;
        let _in_flight = self.begin()?;

        let created = ctx.api.add_crop_listing(&session.token, &request).await.inspect_err(|e| {
            warn!(farmer_id = %farmer.id, error = %e, "crop listing submission failed");
        })?;
        info!(farmer_id = %farmer.id, crop_id = %request.crop_id, "crop listing posted");

        Ok(Submitted {
            route: Route::Dashboard(Role::Farmer),
            created,
        })
    }
}

fn ensure_owner(owner: &Identity, role: Role) -> Result<(), AppError> {
    if owner.role == role {
        Ok(())
    } else {
        Err(AppError::validation(format!("Only a {role} can post this listing")))
    }
}

/// Uploads a crop photo and returns the hosted URL.
pub async fn upload_crop_photo(ctx: &AppContext, session: &Session, path: &Path) -> Result<String, AppError> {
    if session.role != Role::Farmer {
        return Err(AppError::validation("Only farmers can upload crop photos"));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::storage(format!("Failed to read {}", path.display()), e))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::validation("Photo path has no file name"))?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

    let response = ctx
        .api
        .upload_photo(
            &session.token,
            PhotoUpload {
                file_name,
                mime_type,
                bytes,
            },
        )
        .await?;

    response
        .url
        .ok_or_else(|| AppError::UnexpectedPayload("upload response without url".to_string()))
}
