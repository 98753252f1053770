//! Response helpers for server-rendered pages.
//!
//! - [`Found`]: a `302 Found` redirect (axum's `Redirect` only offers 303/307/308)
//! - [`Page`]: an HTML page tagged with the [`TemplateName`] that produced it
//! - [`escape`]: HTML escaping for text interpolated into markup

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

/// Name of the template that rendered a response.
///
/// Stored in the response extensions so tests (and middleware) can tell which
/// page was produced without parsing the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateName(pub &'static str);

/// `302 Found` redirect to `location`.
///
/// # Example
///
/// ```ignore
/// async fn delete(...) -> Result<Found, AppError> {
///     // ...
///     Ok(Found::to("/"))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Found {
    location: String,
}

impl Found {
    /// Redirect to `location`.
    #[must_use]
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        match HeaderValue::try_from(self.location) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(error) => {
                tracing::error!(%error, "Redirect target is not a valid header value");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

/// A rendered HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    status: StatusCode,
    template: &'static str,
    html: String,
}

impl Page {
    /// A `200 OK` page rendered from `template`.
    #[must_use]
    pub const fn ok(template: &'static str, html: String) -> Self {
        Self {
            status: StatusCode::OK,
            template,
            html,
        }
    }

    /// Override the status code (e.g. 422 for a re-rendered invalid form).
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Status the page is served with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Rendered markup.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.html)).into_response();
        response
            .extensions_mut()
            .insert(TemplateName(self.template));
        response
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` for use in HTML text and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn found_is_a_302_with_location() {
        let response = Found::to("/").into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[test]
    fn found_with_invalid_location_is_500() {
        let response = Found::to("/\n").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn page_carries_template_name() {
        let response = Page::ok("home.html", "<p>hi</p>".to_string())
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.extensions().get::<TemplateName>(),
            Some(&TemplateName("home.html"))
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }
}
