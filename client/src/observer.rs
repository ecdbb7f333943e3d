//! Per-wrapper notification subscribers.

use std::fmt;

use catalog_core::ErrorResponse;

type XmlCallback = Box<dyn Fn(&str) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&ErrorResponse) + Send + Sync>;

/// Callback lists owned by one `CatalogWrapper`.
///
/// Subscribers run synchronously, in registration order, on the task making
/// the call. They live and die with the wrapper.
#[derive(Default)]
pub struct Observers {
    xml: Vec<XmlCallback>,
    error: Vec<ErrorCallback>,
}

impl Observers {
    pub fn on_xml_received(&mut self, callback: impl Fn(&str) + Send + Sync + 'static) {
        self.xml.push(Box::new(callback));
    }

    pub fn on_error_received(&mut self, callback: impl Fn(&ErrorResponse) + Send + Sync + 'static) {
        self.error.push(Box::new(callback));
    }

    pub(crate) fn xml_received(&self, body: &str) {
        for callback in &self.xml {
            callback(body);
        }
    }

    pub(crate) fn error_received(&self, error: &ErrorResponse) {
        for callback in &self.error {
            callback(error);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("xml", &self.xml.len())
            .field("error", &self.error.len())
            .finish()
    }
}
