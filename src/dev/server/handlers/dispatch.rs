use actix_web::{HttpRequest, HttpResponse, web};
use log::{debug, error};

use super::super::state::ServerState;
use super::{assets, proxy, upgrade};

/// Entry point for every request that is not a built-in endpoint.
///
/// The proxy table picks at most one rule; unmatched paths are static assets.
pub async fn dispatch(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<ServerState>,
) -> Result<HttpResponse, actix_web::Error> {
    let config = state.config();

    let Some(rule) = config.proxy.route(req.path()) else {
        let tail = req.match_info().query("tail").to_string();
        return assets::serve(&req, &tail, &config.server.static_dir).await;
    };
    debug!("{} {} matched proxy rule {}", req.method(), req.path(), rule.prefix);

    let result = if rule.ws && upgrade::is_upgrade_request(&req) {
        upgrade::tunnel(&req, payload, rule).await
    } else {
        proxy::forward(&req, payload, rule, &state.client).await
    };

    result.map_err(|e| {
        error!("Error proxying {} to {}: {}", req.path(), rule.target, e);
        e.into()
    })
}
