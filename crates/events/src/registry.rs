use crate::args;
use crate::error::EventError;
use crate::native::BrowserEvent;
use html::Document;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds the serializable argument payload for one dispatched event.
pub type EventArgsFactory = Arc<dyn Fn(&Document, &BrowserEvent) -> Value + Send + Sync>;

/// Options for an event type. Built-in types carry only a factory.
#[derive(Clone, Default)]
pub struct EventTypeOptions {
    /// Native event that raises this event type, when it is an alias.
    pub browser_event_name: Option<String>,
    pub create_event_args: Option<EventArgsFactory>,
}

impl EventTypeOptions {
    pub fn alias_of(browser_event_name: impl Into<String>) -> Self {
        Self {
            browser_event_name: Some(browser_event_name.into()),
            create_event_args: None,
        }
    }

    pub fn with_args<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Document, &BrowserEvent) -> Value + Send + Sync + 'static,
    {
        self.create_event_args = Some(Arc::new(factory));
        self
    }
}

impl fmt::Debug for EventTypeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTypeOptions")
            .field("browser_event_name", &self.browser_event_name)
            .field("create_event_args", &self.create_event_args.is_some())
            .finish()
    }
}

const NON_BUBBLING: &[&str] = &[
    "abort",
    "blur",
    "change",
    "error",
    "focus",
    "load",
    "loadend",
    "loadstart",
    "mouseenter",
    "mouseleave",
    "progress",
    "reset",
    "scroll",
    "submit",
    "unload",
    "toggle",
    "DOMNodeInsertedIntoDocument",
    "DOMNodeRemovedFromDocument",
];

const DISABLED_SUPPRESSED: &[&str] = &["click", "dblclick", "mousedown", "mousemove", "mouseup"];

/// Events that are delivered to the target only and are listened for in the
/// capture phase.
pub fn is_non_bubbling(event_name: &str) -> bool {
    NON_BUBBLING.contains(&event_name)
}

/// Mouse events a disabled form control never receives.
pub fn suppressed_when_disabled(event_type: &str) -> bool {
    DISABLED_SUPPRESSED.contains(&event_type)
}

type Builtin = (&'static [&'static str], fn(&Document, &BrowserEvent) -> Value);

const BUILTINS: &[Builtin] = &[
    (&["input", "change"], args::change_args),
    (&["copy", "cut", "paste"], args::empty_args),
    (
        &["drag", "dragend", "dragenter", "dragleave", "dragover", "dragstart", "drop"],
        args::drag_args,
    ),
    (&["focus", "blur", "focusin", "focusout"], args::empty_args),
    (&["keydown", "keyup", "keypress"], args::keyboard_args),
    (
        &[
            "contextmenu",
            "click",
            "mouseover",
            "mouseout",
            "mousemove",
            "mousedown",
            "mouseup",
            "mouseleave",
            "mouseenter",
            "dblclick",
        ],
        args::mouse_args,
    ),
    (&["error"], args::error_args),
    (
        &["loadstart", "timeout", "abort", "load", "loadend", "progress"],
        args::progress_args,
    ),
    (
        &["touchcancel", "touchend", "touchmove", "touchenter", "touchleave", "touchstart"],
        args::touch_args,
    ),
    (
        &[
            "gotpointercapture",
            "lostpointercapture",
            "pointercancel",
            "pointerdown",
            "pointerenter",
            "pointerleave",
            "pointermove",
            "pointerout",
            "pointerover",
            "pointerup",
        ],
        args::pointer_args,
    ),
    (&["wheel", "mousewheel"], args::wheel_args),
    (&["toggle"], args::empty_args),
];

/// Event names with their options, plus the reverse alias index.
#[derive(Clone, Debug)]
pub struct EventTypeRegistry {
    types: HashMap<String, EventTypeOptions>,
    aliases: HashMap<String, Vec<String>>,
}

impl EventTypeRegistry {
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for (names, factory) in BUILTINS {
            let factory: EventArgsFactory = Arc::new(*factory);
            for name in names.iter() {
                types.insert(
                    name.to_string(),
                    EventTypeOptions {
                        browser_event_name: None,
                        create_event_args: Some(factory.clone()),
                    },
                );
            }
        }
        Self {
            types,
            aliases: HashMap::new(),
        }
    }

    /// Register a custom event type. Returns the browser event name when the
    /// new type aliases one, so listener counts can be moved over.
    pub fn register(
        &mut self,
        name: &str,
        options: EventTypeOptions,
    ) -> Result<Option<String>, EventError> {
        if self.types.contains_key(name) {
            return Err(EventError::AlreadyRegistered(name.to_string()));
        }
        let browser_event_name = options.browser_event_name.clone();
        if let Some(browser) = &browser_event_name {
            self.aliases
                .entry(browser.clone())
                .or_default()
                .push(name.to_string());
        }
        self.types.insert(name.to_string(), options);
        Ok(browser_event_name)
    }

    pub fn get(&self, name: &str) -> Option<&EventTypeOptions> {
        self.types.get(name)
    }

    /// The native event a listener must be attached for.
    pub fn browser_event_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.types
            .get(name)
            .and_then(|options| options.browser_event_name.as_deref())
            .unwrap_or(name)
    }

    /// Custom event names raised by the native event `browser_event_name`.
    pub fn aliases_of(&self, browser_event_name: &str) -> &[String] {
        self.aliases
            .get(browser_event_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Argument payload for `event_name`; unknown names get `{}`.
    pub fn create_args(&self, event_name: &str, doc: &Document, event: &BrowserEvent) -> Value {
        match self
            .types
            .get(event_name)
            .and_then(|options| options.create_event_args.as_ref())
        {
            Some(factory) => factory(doc, event),
            None => Value::Object(Default::default()),
        }
    }
}

impl Default for EventTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
