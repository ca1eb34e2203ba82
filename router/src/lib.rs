//! Pattern-based client-side routing for the ripple framework.
//!
//! A [`Router`] holds an ordered route table; [`Router::run`] evaluates the
//! current URL once, tests routes in registration order, and dispatches the
//! first match. String templates use `{name}` tokens for named parameters;
//! a precompiled [`Regex`] may be registered instead, in which case the
//! captured values are keyed positionally (`"0"`, `"1"`, ...).
//!
//! The framework is host-agnostic, so there is no global window to read: a
//! router carries an explicit [`Location`], and the `path`/`hash` overrides
//! take precedence over it.

mod pattern;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::pattern::compile;
pub use crate::pattern::PatternError;

/// Parameters captured from a matched URL: named keys for template tokens,
/// positional keys for precompiled patterns.
pub type RouteParams = BTreeMap<String, String>;

/// Which part of the location a router matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Match against the path (the default).
    #[default]
    Path,
    /// Match against the fragment.
    Hash,
}

/// An explicit stand-in for the host's live location.
#[derive(Debug, Clone, Default)]
pub struct Location {
    /// The current path, with or without a leading `/`.
    pub path: String,
    /// The current fragment, with or without a leading `#`.
    pub hash: String,
}

impl Location {
    /// Creates a location from a path and a fragment.
    #[must_use]
    pub fn new(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
        }
    }
}

/// Receiver for routes registered with a named callback: the name is
/// dispatched to this object instead of a closure.
pub trait RouteHandler {
    /// Handles a dispatched route.
    fn handle(&self, name: &str, params: &RouteParams);
}

/// What to invoke when a route matches.
#[derive(Clone)]
pub enum Callback {
    /// A closure receiving the captured parameters.
    Function(Rc<dyn Fn(&RouteParams)>),
    /// The name of a callback hosted by the router's [`RouteHandler`].
    Named(String),
}

impl Callback {
    /// Wraps a closure.
    pub fn function(f: impl Fn(&RouteParams) + 'static) -> Self {
        Self::Function(Rc::new(f))
    }

    /// Names a handler-hosted callback.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Callback::Function(..)"),
            Self::Named(name) => f.debug_tuple("Callback::Named").field(name).finish(),
        }
    }
}

impl From<&str> for Callback {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Callback {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// A route pattern before compilation.
#[derive(Debug, Clone)]
pub enum PatternSource {
    /// A `{name}`-token template, compiled at registration.
    Template(String),
    /// A precompiled expression, used as given.
    Compiled(Regex),
}

impl From<&str> for PatternSource {
    fn from(template: &str) -> Self {
        Self::Template(template.to_owned())
    }
}

impl From<String> for PatternSource {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

impl From<Regex> for PatternSource {
    fn from(regex: Regex) -> Self {
        Self::Compiled(regex)
    }
}

/// A registered route.
///
/// Each route keeps the captures of its most recent successful
/// [`test`](Route::test) — single most-recent-match state, overwritten on
/// every test, so routes are not reentrant.
pub struct Route {
    source: PatternSource,
    regex: Option<Regex>,
    names: Vec<String>,
    callback: Callback,
    values: RefCell<Vec<String>>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("source", &self.source)
            .field("names", &self.names)
            .field("callback", &self.callback)
            .finish()
    }
}

impl Route {
    fn new(source: PatternSource, callback: Callback) -> Result<Self, PatternError> {
        let (regex, names) = match &source {
            PatternSource::Template(template) => {
                let compiled = compile(template)?;
                (Some(compiled.regex), compiled.names)
            }
            PatternSource::Compiled(regex) => (Some(regex.clone()), Vec::new()),
        };
        Ok(Self {
            source,
            regex,
            names,
            callback,
            values: RefCell::new(Vec::new()),
        })
    }

    /// A route whose pattern failed to compile: registered, never matches.
    fn inert(source: PatternSource, callback: Callback) -> Self {
        Self {
            source,
            regex: None,
            names: Vec::new(),
            callback,
            values: RefCell::new(Vec::new()),
        }
    }

    /// Tests the route against a URL, capturing parameter values on a
    /// match.
    pub fn test(&self, url: &str) -> bool {
        let Some(regex) = &self.regex else {
            return false;
        };
        let Some(captures) = regex.captures(url) else {
            return false;
        };
        *self.values.borrow_mut() = captures
            .iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
            .collect();
        true
    }

    /// The captures of the most recent successful test.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.values.borrow().clone()
    }

    /// Builds the parameter map from the most recent captures: template
    /// token names, or positional indices for precompiled patterns.
    #[must_use]
    pub fn params(&self) -> RouteParams {
        self.values
            .borrow()
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let key = self
                    .names
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| index.to_string());
                (key, value.clone())
            })
            .collect()
    }

    fn dispatch(&self, handler: Option<&Rc<dyn RouteHandler>>) -> RouteParams {
        let params = self.params();
        match &self.callback {
            Callback::Function(callback) => callback(&params),
            Callback::Named(name) => match handler {
                Some(handler) => handler.handle(name, &params),
                None => tracing::error!(
                    "route matched named callback {name:?} but the router has no handler"
                ),
            },
        }
        params
    }
}

/// Construction-time router options.
#[derive(Default)]
pub struct RouterConfig {
    /// Path prefix stripped from matched URLs. Defaults to the empty
    /// string.
    pub path_root: String,
    /// Routes registered at construction, in order.
    pub routes: Vec<(String, Callback)>,
    /// Whether the router matches paths or fragments.
    pub mode: Mode,
    /// Explicit path override; wins over the location.
    pub path: Option<String>,
    /// Explicit fragment override; wins over the location.
    pub hash: Option<String>,
    /// The stand-in for the host's live location.
    pub location: Location,
    /// Receiver for named callbacks.
    pub handler: Option<Rc<dyn RouteHandler>>,
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("path_root", &self.path_root)
            .field("routes", &self.routes.len())
            .field("mode", &self.mode)
            .field("path", &self.path)
            .field("hash", &self.hash)
            .field("location", &self.location)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// An ordered route table over an explicit location.
pub struct Router {
    path_root: String,
    routes: Vec<Route>,
    mode: Mode,
    path: Option<String>,
    hash: Option<String>,
    location: Location,
    handler: Option<Rc<dyn RouteHandler>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("path_root", &self.path_root)
            .field("routes", &self.routes)
            .field("mode", &self.mode)
            .field("path", &self.path)
            .field("hash", &self.hash)
            .field("location", &self.location)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty path-mode router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path_root: String::new(),
            routes: Vec::new(),
            mode: Mode::default(),
            path: None,
            hash: None,
            location: Location::default(),
            handler: None,
        }
    }

    /// Creates a router from construction-time options, registering the
    /// configured routes in order.
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        let mut router = Self {
            path_root: config.path_root,
            routes: Vec::new(),
            mode: config.mode,
            path: config.path,
            hash: config.hash,
            location: config.location,
            handler: config.handler,
        };
        for (pattern, callback) in config.routes {
            router.add(pattern, callback);
        }
        router
    }

    /// Registers a route. Chainable.
    ///
    /// A template that fails to compile is reported and registered inert —
    /// it never matches, and routing continues. Use [`Router::try_add`] to
    /// surface the error instead.
    pub fn add(
        &mut self,
        pattern: impl Into<PatternSource>,
        callback: impl Into<Callback>,
    ) -> &mut Self {
        let source = pattern.into();
        let callback = callback.into();
        match Route::new(source.clone(), callback.clone()) {
            Ok(route) => self.routes.push(route),
            Err(error) => {
                tracing::error!("registering inert route: {error}");
                self.routes.push(Route::inert(source, callback));
            }
        }
        self
    }

    /// Registers a route, surfacing pattern errors.
    ///
    /// # Errors
    ///
    /// Returns the compilation error of a malformed template; nothing is
    /// registered in that case.
    pub fn try_add(
        &mut self,
        pattern: impl Into<PatternSource>,
        callback: impl Into<Callback>,
    ) -> Result<&mut Self, PatternError> {
        let route = Route::new(pattern.into(), callback.into())?;
        self.routes.push(route);
        Ok(self)
    }

    /// Drops every registered route. Chainable.
    pub fn empty(&mut self) -> &mut Self {
        self.routes.clear();
        self
    }

    /// Switches between path and hash matching. Chainable.
    pub fn set_mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Sets the path prefix stripped from matched URLs. Chainable.
    pub fn set_path_root(&mut self, path_root: impl Into<String>) -> &mut Self {
        self.path_root = path_root.into();
        self
    }

    /// Sets the explicit path override. Chainable.
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the explicit fragment override. Chainable.
    pub fn set_hash(&mut self, hash: impl Into<String>) -> &mut Self {
        self.hash = Some(hash.into());
        self
    }

    /// Replaces the router's location. Chainable.
    pub fn set_location(&mut self, location: Location) -> &mut Self {
        self.location = location;
        self
    }

    /// Sets the receiver for named callbacks. Chainable.
    pub fn set_handler(&mut self, handler: Rc<dyn RouteHandler>) -> &mut Self {
        self.handler = Some(handler);
        self
    }

    /// The registered routes, in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The URL the router matches against: the override or location value
    /// for the current mode, with the path root stripped and percent
    /// escapes decoded.
    #[must_use]
    pub fn url(&self) -> String {
        match self.mode {
            Mode::Path => {
                let raw = self.path.clone().unwrap_or_else(|| {
                    let path = self.location.path.as_str();
                    path.strip_prefix('/').unwrap_or(path).to_owned()
                });
                decode(strip_root(&raw, &self.path_root))
            }
            Mode::Hash => {
                let raw = self.hash.clone().unwrap_or_else(|| {
                    let hash = self.location.hash.as_str();
                    hash.strip_prefix('#').unwrap_or(hash).to_owned()
                });
                decode(&raw)
            }
        }
    }

    /// Evaluates the URL once, tests routes in registration order, and
    /// dispatches the first match. Returns the dispatched parameters, or
    /// `None` when nothing matched — an unmatched URL is not an error.
    pub fn run(&self) -> Option<RouteParams> {
        let url = self.url();
        self.routes
            .iter()
            .find(|route| route.test(&url))
            .map(|route| route.dispatch(self.handler.as_ref()))
    }

    /// Tests one ad hoc pattern against the current URL without
    /// registering it, dispatching on a match.
    pub fn match_now(
        &self,
        pattern: impl Into<PatternSource>,
        callback: impl Into<Callback>,
    ) -> Option<RouteParams> {
        let route = match Route::new(pattern.into(), callback.into()) {
            Ok(route) => route,
            Err(error) => {
                tracing::error!("cannot match against a malformed pattern: {error}");
                return None;
            }
        };
        if route.test(&self.url()) {
            Some(route.dispatch(self.handler.as_ref()))
        } else {
            None
        }
    }
}

fn strip_root<'a>(raw: &'a str, root: &str) -> &'a str {
    let rest = if !root.is_empty() && raw.starts_with(root) {
        &raw[root.len()..]
    } else {
        raw
    };
    rest.strip_prefix('/').unwrap_or(rest)
}

fn decode(url: &str) -> String {
    percent_decode_str(url).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use regex::Regex;

    use super::{Callback, Location, Mode, Route, RouteHandler, RouteParams, Router, RouterConfig};

    fn params(entries: &[(&str, &str)]) -> RouteParams {
        entries
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn named_parameters_are_extracted() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut router = Router::new();
        router.set_path("users/42").add(
            "/users/{id}",
            Callback::function({
                let seen = Rc::clone(&seen);
                move |params: &RouteParams| seen.borrow_mut().push(params.clone())
            }),
        );

        let dispatched = router.run().expect("route matches");
        assert_eq!(dispatched, params(&[("id", "42")]));
        assert_eq!(&*seen.borrow(), &[params(&[("id", "42")])]);
    }

    #[test]
    fn multiple_parameters_map_by_name() {
        let mut router = Router::new();
        router.set_path("a/1/2").add("/a/{x}/{y}", Callback::function(|_| {}));

        assert_eq!(router.run(), Some(params(&[("x", "1"), ("y", "2")])));
    }

    #[test]
    fn unmatched_url_dispatches_nothing() {
        let called = Rc::new(RefCell::new(false));
        let mut router = Router::new();
        router.set_path("nowhere").add(
            "/users/{id}",
            Callback::function({
                let called = Rc::clone(&called);
                move |_| *called.borrow_mut() = true
            }),
        );

        assert_eq!(router.run(), None);
        assert!(!*called.borrow());
    }

    #[test]
    fn first_matching_route_wins_in_registration_order() {
        let winner = Rc::new(RefCell::new(""));
        let mut router = Router::new();
        router
            .set_path("users/7")
            .add(
                "/users/{id}",
                Callback::function({
                    let winner = Rc::clone(&winner);
                    move |_| *winner.borrow_mut() = "first"
                }),
            )
            .add(
                "/users/{other}",
                Callback::function({
                    let winner = Rc::clone(&winner);
                    move |_| *winner.borrow_mut() = "second"
                }),
            );

        router.run();
        assert_eq!(*winner.borrow(), "first");
    }

    #[test]
    fn precompiled_patterns_capture_positionally() {
        let mut router = Router::new();
        router.set_path("tag/rust/9").add(
            Regex::new(r"^tag/(\w+)/(\d+)$").unwrap(),
            Callback::function(|_| {}),
        );

        assert_eq!(router.run(), Some(params(&[("0", "rust"), ("1", "9")])));
    }

    #[test]
    fn path_root_is_stripped_before_matching() {
        let mut router = Router::new();
        router
            .set_path_root("app")
            .set_path("app/users/3")
            .add("/users/{id}", Callback::function(|_| {}));

        assert_eq!(router.url(), "users/3");
        assert_eq!(router.run(), Some(params(&[("id", "3")])));
    }

    #[test]
    fn hash_mode_reads_the_fragment() {
        let mut router = Router::new();
        router
            .set_mode(Mode::Hash)
            .set_location(Location::new("/ignored", "#settings/audio"))
            .add("settings/{section}", Callback::function(|_| {}));

        assert_eq!(router.url(), "settings/audio");
        assert_eq!(router.run(), Some(params(&[("section", "audio")])));
    }

    #[test]
    fn urls_are_percent_decoded() {
        let router_url = {
            let mut router = Router::new();
            router.set_path("files/a%20b");
            router.url()
        };
        assert_eq!(router_url, "files/a b");
    }

    #[test]
    fn location_path_is_used_when_no_override_is_set() {
        let mut router = Router::new();
        router
            .set_location(Location::new("/users/11", ""))
            .add("/users/{id}", Callback::function(|_| {}));

        assert_eq!(router.run(), Some(params(&[("id", "11")])));
    }

    struct Recorder(RefCell<Vec<(String, RouteParams)>>);

    impl RouteHandler for Recorder {
        fn handle(&self, name: &str, params: &RouteParams) {
            self.0.borrow_mut().push((name.to_owned(), params.clone()));
        }
    }

    #[test]
    fn named_callbacks_dispatch_through_the_handler() {
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let mut router = Router::new();
        router
            .set_handler(recorder.clone())
            .set_path("users/5")
            .add("/users/{id}", "showUser");

        router.run();
        assert_eq!(
            &*recorder.0.borrow(),
            &[("showUser".to_owned(), params(&[("id", "5")]))]
        );
    }

    #[test]
    fn named_callback_without_handler_is_reported_not_fatal() {
        let mut router = Router::new();
        router.set_path("users/5").add("/users/{id}", "showUser");

        // Dispatch happens (the route matched); the missing handler is a
        // diagnostic, not an error.
        assert_eq!(router.run(), Some(params(&[("id", "5")])));
    }

    #[test]
    fn match_now_tests_without_registering() {
        let mut router = Router::new();
        router.set_path("posts/abc");

        let matched = router.match_now("/posts/{slug}", Callback::function(|_| {}));
        assert_eq!(matched, Some(params(&[("slug", "abc")])));
        assert!(router.routes().is_empty());
    }

    #[test]
    fn malformed_templates_register_inert_routes() {
        let mut router = Router::new();
        router.set_path("broken/x").add("/broken/{", Callback::function(|_| {}));

        assert_eq!(router.routes().len(), 1);
        assert_eq!(router.run(), None);
        assert!(router.try_add("/broken/{", Callback::function(|_| {})).is_err());
    }

    #[test]
    fn routes_keep_their_most_recent_captures() {
        let route = Route::new("/users/{id}".into(), Callback::function(|_| {})).unwrap();
        assert!(route.test("users/1"));
        assert_eq!(route.values(), ["1"]);
        assert!(route.test("users/2"));
        assert_eq!(route.values(), ["2"]);
        assert_eq!(route.params(), params(&[("id", "2")]));
    }

    #[test]
    fn config_registers_routes_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let router = Router::with_config(RouterConfig {
            path: Some("users/8".into()),
            routes: vec![(
                "/users/{id}".into(),
                Callback::function({
                    let seen = Rc::clone(&seen);
                    move |params: &RouteParams| seen.borrow_mut().push(params.clone())
                }),
            )],
            ..RouterConfig::default()
        });

        router.run();
        assert_eq!(seen.borrow().len(), 1);
    }
}
