pub type ContentResult<T> = Result<T, ContentError>;

/// User-facing messages, in the site's language.
pub(crate) mod messages {
    pub const PROJECT_NOT_FOUND: &str = "Проект не найден";
    pub const PROJECT_LOAD_FAILED: &str = "Ошибка загрузки проекта";
    pub const PROJECTS_NOT_FOUND: &str = "Проекты не найдены";
    pub const PROJECTS_LOAD_FAILED: &str = "Ошибка загрузки проектов";
    pub const SERVICE_UNAVAILABLE: &str =
        "Не удалось подключиться к серверу. Проверьте интернет-соединение.";
    pub const SUBMIT_UNAVAILABLE: &str = "Сервис недоступен";
    pub const SUBMIT_FAILED: &str = "Не удалось отправить заявку";

    pub fn unknown_slug(slug: &str) -> String {
        format!("Проект с slug \"{}\" не существует", slug)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    /// Non-success response; never retried.
    #[error("{message} (status {status})")]
    Backend {
        status: u16,
        message: String,
        slug: Option<String>,
    },

    /// Nothing matched the request.
    #[error("{message}")]
    NotFound { message: String, slug: Option<String> },

    /// The backend stayed unreachable after every retry.
    #[error("{message}")]
    ServiceUnavailable {
        message: String,
        slug: Option<String>,
        #[source]
        source: reqwest::Error,
    },

    /// The client could not be built from its configuration.
    #[error("{message}")]
    Client { message: String },

    /// A lead submission never reached the backend.
    #[error("{message}: {source}")]
    Submit {
        message: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ContentError {
    /// HTTP-like status for callers rendering an error page.
    pub fn status_code(&self) -> u16 {
        match self {
            ContentError::Backend { status, .. } => *status,
            ContentError::NotFound { .. } => 404,
            ContentError::ServiceUnavailable { .. } => 503,
            ContentError::Client { .. } | ContentError::Submit { .. } => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ContentError::Backend { message, .. }
            | ContentError::NotFound { message, .. }
            | ContentError::ServiceUnavailable { message, .. }
            | ContentError::Client { message }
            | ContentError::Submit { message, .. } => message,
        }
    }

    /// Slug of the project the failed request was about.
    pub fn slug(&self) -> Option<&str> {
        match self {
            ContentError::Backend { slug, .. }
            | ContentError::NotFound { slug, .. }
            | ContentError::ServiceUnavailable { slug, .. } => slug.as_deref(),
            ContentError::Client { .. } | ContentError::Submit { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}
