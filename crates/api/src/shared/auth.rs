use crate::error::DocketError;
use actix_web::HttpRequest;
use docket_infra::DocketContext;

/// Only operators knowing the configured api key may use the route
pub fn protect_operator_route(req: &HttpRequest, ctx: &DocketContext) -> Result<(), DocketError> {
    let api_key = match req.headers().get("x-api-key") {
        Some(api_key) => match api_key.to_str() {
            Ok(api_key) => api_key,
            Err(_) => {
                return Err(DocketError::Unauthorized(
                    "Malformed api key provided".to_string(),
                ))
            }
        },
        None => {
            return Err(DocketError::Unauthorized(
                "Unable to find api-key in x-api-key header".to_string(),
            ))
        }
    };

    if api_key != ctx.config.api_key {
        return Err(DocketError::Unauthorized(
            "Invalid api-key provided in x-api-key header".to_string(),
        ));
    }
    Ok(())
}
