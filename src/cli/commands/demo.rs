//! Demo command - walk one session through its lifecycle

use crate::config::Config;
use crate::cookie::{RequestCookies, ResponseCookies};
use crate::error::{WsmError, WsmResult};
use crate::session::SessionManager;
use crate::ui::{self, Status, UiContext};
use serde_json::json;

/// Execute the demo command
pub async fn execute(config: &Config) -> WsmResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Session lifecycle");

    let manager = SessionManager::from_config(config).await?;
    ui::key_value(&ctx, "Storage", manager.storage().name());
    ui::key_value(&ctx, "Cookie", manager.cookie_name());
    ui::key_value(
        &ctx,
        "Lifetime",
        &format!("{}s", manager.max_lifetime().as_secs()),
    );

    // First request: no cookie
    let mut response = ResponseCookies::new();
    let session = manager
        .start_session(&RequestCookies::new(), &mut response)
        .await?;
    session.set_value("visits", json!(1)).await?;
    ui::step(&ctx, Status::Ok, "Session started");
    print_headers(&response);

    let cookie = response
        .get(manager.cookie_name())
        .cloned()
        .ok_or_else(|| WsmError::Internal("session cookie was not issued".to_string()))?;
    let request = RequestCookies::new().with(cookie.name, cookie.value);

    // Second request: same cookie, same session
    let mut response = ResponseCookies::new();
    let resumed = manager.start_session(&request, &mut response).await?;
    let visits = resumed
        .get_value("visits")
        .await?
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    resumed.set_value("visits", json!(visits + 1)).await?;
    ui::step_detail(
        &ctx,
        Status::Ok,
        "Session resumed",
        &format!("visits = {}", visits + 1),
    );

    // Logout
    let mut response = ResponseCookies::new();
    manager.end_session(&request, &mut response).await;
    ui::step(&ctx, Status::Ok, "Session ended");
    print_headers(&response);

    match manager.start_session(&request, &mut ResponseCookies::new()).await {
        Err(WsmError::SessionNotExist) => {
            ui::step(&ctx, Status::Info, "Ended session can no longer be resumed")
        }
        Err(e) => return Err(e),
        Ok(_) => {
            return Err(WsmError::Internal(
                "ended session was still retrievable".to_string(),
            ))
        }
    }

    Ok(())
}

fn print_headers(response: &ResponseCookies) {
    for header in response.header_values() {
        println!("Set-Cookie: {}", header);
    }
}
