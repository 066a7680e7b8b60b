//! The tag registry.
//!
//! [`Registry`] owns the ordered set of tags an evaluation dispatches to,
//! together with the evaluation state: delimiters, the current nesting depth,
//! the pre-scan hook, and an opaque host context.
//!
//! # Ordering and names
//!
//! Names are unique. Tags are kept in insertion order and dispatch tries them
//! in that order, so the first tag whose predicate accepts a span handles it.
//! Adding a tag under an existing name replaces the old tag in place, keeping
//! its dispatch position.
//!
//! # Scoped bindings
//!
//! Tags that should only live for part of an evaluation (the per-row values of
//! a repeat loop, say) are bound inside [`Registry::scoped`]:
//!
//! ```rust
//! use weft::{Registry, ValueTag};
//!
//! let mut registry = Registry::new();
//! registry.set("who", "world");
//!
//! let inner = registry.scoped(|registry| {
//!     registry.bind(ValueTag::new("who", "scope"));
//!     registry.render_str("hello <!--%who%-->")
//! });
//!
//! assert_eq!(inner.unwrap(), "hello scope");
//! assert_eq!(registry.render_str("hello <!--%who%-->").unwrap(), "hello world");
//! ```
//!
//! A binding shadows a registry tag of the same name, taking over its
//! dispatch position; other bindings are tried after every registry tag, with
//! inner scopes shadowing outer ones. Bindings are visible to lookups and
//! dispatch but are not counted by [`count`](Registry::count),
//! [`tag_at`](Registry::tag_at) or [`iter`](Registry::iter). Whatever path the
//! closure leaves by, its bindings are gone afterwards.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use weft_pipe::{CommandRunner, ShellRunner};

use crate::config::EngineConfig;
use crate::env::{EnvLookup, RealEnv};
use crate::error::{Result, TemplateError};
use crate::tag::Tag;
use crate::tags::{builtin_tags, ValueTag};

/// Callback run once before the outermost scan of each evaluation.
///
/// It receives the registry and the output sink, and may write to the sink
/// and change the registry before any template text is processed.
pub type PreScanHook = Box<dyn FnMut(&mut Registry, &mut dyn Write) -> Result<()>>;

/// An entry for [`Registry::add_all`].
pub enum Binding {
    /// A value tag: name and text.
    Text(String, String),
    /// Any prepared tag.
    Tag(Box<dyn Tag>),
}

impl Binding {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Binding::Text(name.into(), value.into())
    }

    fn name(&self) -> &str {
        match self {
            Binding::Text(name, _) => name,
            Binding::Tag(tag) => tag.name(),
        }
    }
}

/// An ordered, name-keyed collection of tags plus evaluation state.
pub struct Registry {
    tags: Vec<Rc<dyn Tag>>,
    frames: Vec<Vec<Rc<dyn Tag>>>,
    config: EngineConfig,
    pub(crate) depth: usize,
    // First unclosed tag met by a nested evaluation, reported when the
    // outermost one finishes.
    pub(crate) deferred: Option<TemplateError>,
    pub(crate) pre_scan: Option<PreScanHook>,
    context: Option<Box<dyn Any>>,
    env: Rc<dyn EnvLookup>,
    runner: Rc<dyn CommandRunner>,
}

impl Registry {
    /// A registry with the default delimiters and the built-in tags.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// A registry with the built-in tags, configured by `config`.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// A registry with the default configuration and no tags at all.
    pub fn empty() -> Self {
        Self::bare(EngineConfig::default())
    }

    fn build(config: EngineConfig) -> Self {
        let mut registry = Self::bare(config);
        for tag in builtin_tags() {
            registry.add_boxed(tag);
        }
        registry
    }

    fn bare(config: EngineConfig) -> Self {
        let runner = match config.exec_timeout() {
            Some(timeout) => ShellRunner::new().with_timeout(timeout),
            None => ShellRunner::new(),
        };
        Self {
            tags: Vec::new(),
            frames: Vec::new(),
            config,
            depth: 0,
            deferred: None,
            pre_scan: None,
            context: None,
            env: Rc::new(RealEnv),
            runner: Rc::new(runner),
        }
    }

    // ------------------------------------------------------------------
    // Adding and removing
    // ------------------------------------------------------------------

    /// Adds `tag`, giving it the registry's current field delimiter.
    ///
    /// A tag already registered under the same name is torn down and the new
    /// one takes its position.
    pub fn add<T: Tag + 'static>(&mut self, tag: T) {
        self.add_boxed(Box::new(tag));
    }

    /// Like [`add`](Registry::add), for tags that are already boxed.
    pub fn add_boxed(&mut self, mut tag: Box<dyn Tag>) {
        tag.header_mut().set_delimiter(self.config.field_delimiter.clone());
        self.insert(Rc::from(tag));
    }

    fn insert(&mut self, tag: Rc<dyn Tag>) {
        match self.tags.iter().position(|t| t.name() == tag.name()) {
            Some(index) => {
                tracing::debug!(tag = tag.name(), "replacing tag");
                let old = std::mem::replace(&mut self.tags[index], tag);
                old.teardown();
            }
            None => self.tags.push(tag),
        }
    }

    /// Adds a value tag named `name` holding `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.add(ValueTag::new(name, value));
    }

    /// Adds a value tag holding the decimal rendering of `value`.
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.add(ValueTag::from_int(name, value));
    }

    /// Adds a batch of tags in order.
    ///
    /// The batch ends at the first entry with an empty name; the entries
    /// before it are kept. Returns how many were added.
    pub fn add_all(&mut self, bindings: impl IntoIterator<Item = Binding>) -> usize {
        let mut added = 0;
        for binding in bindings {
            if binding.name().is_empty() {
                tracing::debug!(added, "empty name ends the batch");
                break;
            }
            match binding {
                Binding::Text(name, value) => self.set(name, value),
                Binding::Tag(tag) => self.add_boxed(tag),
            }
            added += 1;
        }
        added
    }

    /// Removes and tears down the tag called `name`. Returns whether one was
    /// found.
    pub fn remove<N: AsRef<[u8]> + ?Sized>(&mut self, name: &N) -> bool {
        let name = name.as_ref();
        match self.tags.iter().position(|t| t.name().as_bytes() == name) {
            Some(index) => {
                let tag = self.tags.remove(index);
                tag.teardown();
                true
            }
            None => false,
        }
    }

    /// Removes the registered tag sharing `tag`'s name.
    pub fn remove_tag(&mut self, tag: &dyn Tag) -> bool {
        let name = tag.name().to_string();
        self.remove(&name)
    }

    // ------------------------------------------------------------------
    // Scoped bindings
    // ------------------------------------------------------------------

    /// Runs `f` with a fresh binding scope, discarding the scope's bindings
    /// once `f` returns.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Registry) -> R) -> R {
        self.frames.push(Vec::new());
        let level = self.frames.len();
        let result = f(self);
        for frame in self.frames.drain(level - 1..) {
            for tag in frame {
                tag.teardown();
            }
        }
        result
    }

    /// Binds `tag` in the innermost scope and returns a handle to it.
    ///
    /// A binding with a name already bound in the same scope replaces it.
    /// Outside any scope the tag is added to the registry, as by
    /// [`add`](Registry::add).
    pub fn bind<T: Tag + 'static>(&mut self, mut tag: T) -> Rc<T> {
        tag.header_mut().set_delimiter(self.config.field_delimiter.clone());
        let tag = Rc::new(tag);
        let shared: Rc<dyn Tag> = tag.clone();
        match self.frames.last_mut() {
            Some(frame) => match frame.iter().position(|t| t.name() == shared.name()) {
                Some(index) => std::mem::replace(&mut frame[index], shared).teardown(),
                None => frame.push(shared),
            },
            None => self.insert(shared),
        }
        tag
    }

    fn resolve(&self, name: &[u8]) -> Option<&Rc<dyn Tag>> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|t| t.name().as_bytes() == name)
            .or_else(|| self.tags.iter().find(|t| t.name().as_bytes() == name))
    }

    /// The first visible tag whose predicate accepts `span`.
    pub(crate) fn handler_for(&self, span: &[u8]) -> Option<Rc<dyn Tag>> {
        if self.frames.is_empty() {
            return self.tags.iter().find(|t| t.matches(span)).cloned();
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for tag in &self.tags {
            seen.insert(tag.name());
            let visible = self.resolve(tag.name().as_bytes()).unwrap_or(tag);
            if visible.matches(span) {
                return Some(Rc::clone(visible));
            }
        }
        for tag in self.frames.iter().flat_map(|frame| frame.iter()) {
            if !seen.insert(tag.name()) {
                continue;
            }
            let visible = self.resolve(tag.name().as_bytes()).unwrap_or(tag);
            if visible.matches(span) {
                return Some(Rc::clone(visible));
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// The visible tag called `name`, bindings included.
    pub fn get<N: AsRef<[u8]> + ?Sized>(&self, name: &N) -> Option<&dyn Tag> {
        self.resolve(name.as_ref()).map(|t| &**t)
    }

    pub fn contains<N: AsRef<[u8]> + ?Sized>(&self, name: &N) -> bool {
        self.resolve(name.as_ref()).is_some()
    }

    /// The value of the visible tag called `name`.
    ///
    /// `None` when there is no such tag, it carries no value, or its value is
    /// absent.
    pub fn value_of<N: AsRef<[u8]> + ?Sized>(&self, name: &N) -> Option<&str> {
        self.get(name)
            .filter(|t| t.has_value())
            .and_then(|t| t.value())
    }

    /// Number of registered tags, bindings excluded.
    pub fn count(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The registered tag at `index` in dispatch order.
    pub fn tag_at(&self, index: usize) -> Option<&dyn Tag> {
        self.tags.get(index).map(|t| &**t)
    }

    /// Registered tags in dispatch order, bindings excluded.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Tag> + '_ {
        self.tags.iter().map(|t| &**t)
    }

    /// `base` if no visible tag has that name, otherwise the first of
    /// `base_2`, `base_3`, ... that is free.
    pub fn free_name(&self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 1;
        while self.contains(&name) {
            suffix += 1;
            name = format!("{base}_{suffix}");
        }
        name
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn start_delimiter(&self) -> &str {
        &self.config.start_delimiter
    }

    pub fn end_delimiter(&self) -> &str {
        &self.config.end_delimiter
    }

    pub fn field_delimiter(&self) -> &str {
        &self.config.field_delimiter
    }

    /// Changes the span delimiters used by subsequent scans.
    pub fn set_delimiters(&mut self, start: impl Into<String>, end: impl Into<String>) -> Result<()> {
        let (start, end) = (start.into(), end.into());
        if start.is_empty() || end.is_empty() {
            return Err(TemplateError::Config(
                "tag delimiters must not be empty".to_string(),
            ));
        }
        self.config.start_delimiter = start;
        self.config.end_delimiter = end;
        Ok(())
    }

    /// Changes the field delimiter given to tags added from now on. Tags
    /// already registered keep theirs.
    pub fn set_field_delimiter(&mut self, delimiter: impl Into<String>) -> Result<()> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(TemplateError::Config(
                "field delimiter must not be empty".to_string(),
            ));
        }
        self.config.field_delimiter = delimiter;
        Ok(())
    }

    pub fn max_repeat_iterations(&self) -> Option<usize> {
        self.config.max_repeat_iterations
    }

    pub fn set_max_repeat_iterations(&mut self, limit: Option<usize>) {
        self.config.max_repeat_iterations = limit;
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    /// Replaces the environment `ENV` reads from.
    pub fn set_env(&mut self, env: impl EnvLookup + 'static) {
        self.env = Rc::new(env);
    }

    pub fn env(&self) -> Rc<dyn EnvLookup> {
        Rc::clone(&self.env)
    }

    /// Replaces the runner `EXEC` hands commands to.
    pub fn set_command_runner(&mut self, runner: impl CommandRunner + 'static) {
        self.runner = Rc::new(runner);
    }

    pub fn command_runner(&self) -> Rc<dyn CommandRunner> {
        Rc::clone(&self.runner)
    }

    // ------------------------------------------------------------------
    // Evaluation state
    // ------------------------------------------------------------------

    /// Installs the hook run before each outermost scan, replacing any
    /// previous one.
    pub fn set_pre_scan_hook(
        &mut self,
        hook: impl FnMut(&mut Registry, &mut dyn Write) -> Result<()> + 'static,
    ) {
        self.pre_scan = Some(Box::new(hook));
    }

    pub fn clear_pre_scan_hook(&mut self) {
        self.pre_scan = None;
    }

    pub fn has_pre_scan_hook(&self) -> bool {
        self.pre_scan.is_some()
    }

    /// Current nesting depth: 0 outside evaluation, 1 in the outermost scan.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Stores a host value for tags and hooks to read back, replacing any
    /// previous one.
    pub fn set_context<T: Any>(&mut self, value: T) {
        self.context = Some(Box::new(value));
    }

    /// The stored context, if there is one of type `T`.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_ref().and_then(|c| c.downcast_ref())
    }

    pub fn context_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.context.as_mut().and_then(|c| c.downcast_mut())
    }

    /// Removes the context and returns it if it is a `T`.
    pub fn take_context<T: Any>(&mut self) -> Option<T> {
        match self.context.take()?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.context = Some(other);
                None
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        for frame in self.frames.drain(..) {
            for tag in frame {
                tag.teardown();
            }
        }
        for tag in self.tags.drain(..) {
            tag.teardown();
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.tags.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("scopes", &self.frames.len())
            .field("config", &self.config)
            .field("depth", &self.depth)
            .field("pre_scan_hook", &self.pre_scan.is_some())
            .finish_non_exhaustive()
    }
}
