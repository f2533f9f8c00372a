use askama::Template;

/// Login page. `error` is empty when there is nothing to show.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: String,
    pub app_name: &'static str,
    pub csrf_token: String,
}

/// Second login step for accounts with TOTP enabled.
#[derive(Template)]
#[template(path = "totp.html")]
pub struct TotpTemplate {
    pub error: String,
    pub app_name: &'static str,
    pub csrf_token: String,
}
