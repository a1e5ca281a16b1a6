use log::{info, warn};
use rocket::{
    form::Form,
    http::{Cookie, CookieJar},
    request::FlashMessage,
    response::{Flash, Redirect},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::Result,
    model::{
        api::login::{Credentials, LoginPage},
        auth::{forget_session, AuthToken, AUTH_TOKEN_COOKIE},
        store::{AccountStore, Store},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![login_page, login, logout]
}

#[get("/login")]
pub fn login_page(flash: Option<FlashMessage<'_>>) -> Json<LoginPage> {
    Json(LoginPage {
        notice: flash.map(Into::into),
    })
}

#[post("/login", data = "<credentials>")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Form<Credentials>,
    store: Store,
    config: &State<Config>,
) -> Result<Flash<Redirect>> {
    let account = store
        .account_by_username(&credentials.username)
        .await?
        .filter(|account| account.verify_password(&credentials.password));

    let Some(account) = account else {
        warn!("Failed login attempt for '{}'", credentials.username);
        return Ok(Flash::error(
            Redirect::to(uri!(login_page)),
            "Invalid username or password.",
        ));
    };

    info!("'{}' logged in", account.username);
    let message = format!("Welcome back, {}!", account.username);
    forget_session(cookies);
    cookies.add(AuthToken::new(&account).into_cookie(config));

    Ok(Flash::success(
        Redirect::to(uri!(super::voting::home)),
        message,
    ))
}

#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Flash<Redirect> {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    forget_session(cookies);
    Flash::new(
        Redirect::to(uri!(login_page)),
        "info",
        "You have been logged out.",
    )
}
