use serde::Deserialize;

/// Static app configuration, loaded once before session start and
/// never mutated. Capability flags feed the control-bar derivation;
/// display fields are passed through to the presentation layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub page_title: String,
    pub page_description: String,
    pub company_name: String,

    pub supports_chat_input: bool,
    pub supports_video_input: bool,
    pub supports_screen_share: bool,
    pub is_pre_connect_buffer_enabled: bool,

    pub logo: String,
    pub start_button_text: String,
    pub accent: Option<String>,
    pub logo_dark: Option<String>,
    pub accent_dark: Option<String>,

    pub sandbox_id: Option<String>,
    pub agent_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_title: "NOVA Voice".into(),
            page_description: "Your quantum shopping assistant for groceries in 10 minutes."
                .into(),
            company_name: "NOVA".into(),
            supports_chat_input: true,
            supports_video_input: false,
            supports_screen_share: false,
            is_pre_connect_buffer_enabled: true,
            logo: "/logo.svg".into(),
            start_button_text: "START ORDERING".into(),
            accent: Some("#0C831F".into()),
            logo_dark: Some("/logo.svg".into()),
            accent_dark: Some("#0C831F".into()),
            sandbox_id: None,
            agent_name: Some("nova-agent".into()),
        }
    }
}
