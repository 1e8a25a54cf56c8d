use crate::AppContext;
use crate::error::app_error::AppError;
use crate::models::catalog::{AddCropRequest, Catalog};
use crate::models::listing::CreatedResponse;
use crate::models::session::Session;
use crate::util::blank_fields;
use tracing::info;
use validator::Validate;

pub struct CatalogService<'a> {
    ctx: &'a AppContext,
}

impl<'a> CatalogService<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        CatalogService { ctx }
    }

    /// Crops and markets are independent, so both requests run together.
    pub async fn load(&self, session: &Session) -> Result<Catalog, AppError> {
        let (crops, markets) = tokio::try_join!(self.ctx.api.list_crops(&session.token), self.ctx.api.list_markets(&session.token))?;
        info!(crops = crops.len(), markets = markets.len(), "catalog loaded");
        Ok(Catalog { crops, markets })
    }

    pub async fn add_crop(&self, session: &Session, request: AddCropRequest) -> Result<CreatedResponse, AppError> {
        let missing = blank_fields(&[
            ("name", Some(request.name.as_str())),
            ("variety", Some(request.variety.as_str())),
            ("grade", Some(request.grade.as_str())),
        ]);
        if !missing.is_empty() {
            return Err(AppError::missing_fields());
        }
        request.validate()?;

        let created = self.ctx.api.add_crop(&session.token, &request).await?;
        info!(crop = %request.name, "crop added");
        Ok(created)
    }
}
