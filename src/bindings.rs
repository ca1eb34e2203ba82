//! Declarative property bindings.
//!
//! Instead of decorating instance fields, a component declares a list of
//! [`BindingSpec`] entries and hands them to [`BindingSet::build`] during
//! its definition call. The set produces typed accessors over the shared
//! props map: an [`InputBinding`] reads and writes the backing prop
//! (writing re-renders the instance exactly once), an [`OutputBinding`]
//! emits upward through the `<prop>Changed` callback convention.

use std::collections::BTreeMap;

use ripple_core::{Context, Event, Props, Updater, Value};

/// Which way a bound prop flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Parent-supplied data exposed as a readable/writable field.
    Input,
    /// Child-to-parent notification through a callback prop.
    Output,
}

/// One declared binding.
#[derive(Debug, Clone, Copy)]
pub struct BindingSpec {
    /// The prop the binding reads and writes.
    pub prop: &'static str,
    /// Which way the binding flows.
    pub direction: Direction,
}

impl BindingSpec {
    /// Declares an input binding.
    #[must_use]
    pub const fn input(prop: &'static str) -> Self {
        Self {
            prop,
            direction: Direction::Input,
        }
    }

    /// Declares an output binding.
    #[must_use]
    pub const fn output(prop: &'static str) -> Self {
        Self {
            prop,
            direction: Direction::Output,
        }
    }
}

/// A readable, writable view of one parent-supplied prop.
#[derive(Debug, Clone)]
pub struct InputBinding {
    props: Props,
    prop: String,
    updater: Updater,
}

impl InputBinding {
    /// Reads the backing prop.
    #[must_use]
    pub fn get(&self) -> Option<Value> {
        self.props.value(&self.prop)
    }

    /// Writes the backing prop and re-renders the owning instance.
    pub fn set(&self, value: impl Into<Value>) {
        self.props.insert(self.prop.clone(), value.into());
        self.updater.request();
    }
}

/// An emitter over one prop, following the `<prop>Changed` convention.
#[derive(Debug, Clone)]
pub struct OutputBinding {
    props: Props,
    prop: String,
    updater: Updater,
}

impl OutputBinding {
    /// Writes the value back into the shared props (visible to the
    /// parent), invokes the `<prop>Changed` callback prop when one is
    /// present, and re-renders the owning instance.
    pub fn emit(&self, value: impl Into<Value>) {
        let value = value.into();
        self.props.insert(self.prop.clone(), value.clone());

        let callback_name = format!("{}Changed", self.prop);
        if let Some(callback) = self.props.handler(&callback_name) {
            callback.call(&Event::with_detail(callback_name, value));
        }
        self.updater.request();
    }
}

/// The accessors generated from a component's binding declarations.
#[derive(Debug, Default)]
pub struct BindingSet {
    inputs: BTreeMap<String, InputBinding>,
    outputs: BTreeMap<String, OutputBinding>,
}

impl BindingSet {
    /// Consumes the declared specs, generating an accessor per entry bound
    /// to this instance's props and re-render trigger.
    #[must_use]
    pub fn build(ctx: &Context, props: &Props, specs: &[BindingSpec]) -> Self {
        let mut set = Self::default();
        for spec in specs {
            match spec.direction {
                Direction::Input => {
                    set.inputs.insert(
                        spec.prop.to_owned(),
                        InputBinding {
                            props: props.clone(),
                            prop: spec.prop.to_owned(),
                            updater: ctx.updater().clone(),
                        },
                    );
                }
                Direction::Output => {
                    set.outputs.insert(
                        spec.prop.to_owned(),
                        OutputBinding {
                            props: props.clone(),
                            prop: spec.prop.to_owned(),
                            updater: ctx.updater().clone(),
                        },
                    );
                }
            }
        }
        set
    }

    /// The input accessor declared for `prop`.
    #[must_use]
    pub fn input(&self, prop: &str) -> Option<&InputBinding> {
        self.inputs.get(prop)
    }

    /// The output accessor declared for `prop`.
    #[must_use]
    pub fn output(&self, prop: &str) -> Option<&OutputBinding> {
        self.outputs.get(prop)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use ripple_core::{Context, Handler, Props, Registry, Store, Updater};
    use serde_json::json;

    use super::{BindingSet, BindingSpec};

    fn context_counting_renders() -> (Context, Rc<Cell<usize>>) {
        let updater = Updater::new();
        let renders = Rc::new(Cell::new(0));
        updater.connect(Rc::new({
            let renders = Rc::clone(&renders);
            move || renders.set(renders.get() + 1)
        }));
        (
            Context::new(Store::new(), Registry::new(), updater),
            renders,
        )
    }

    #[test]
    fn input_set_writes_the_prop_and_rerenders_once() {
        let (ctx, renders) = context_counting_renders();
        let props = Props::new();
        props.insert("item", "before");

        let bindings = BindingSet::build(&ctx, &props, &[BindingSpec::input("item")]);
        let item = bindings.input("item").expect("declared");

        assert_eq!(item.get(), Some(json!("before")));
        item.set("after");

        assert_eq!(props.value("item"), Some(json!("after")));
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn output_emit_writes_back_and_fires_the_callback_prop() {
        let (ctx, renders) = context_counting_renders();
        let received = Rc::new(RefCell::new(Vec::new()));
        let props = Props::new();
        props.insert(
            "itemChanged",
            Handler::new({
                let received = Rc::clone(&received);
                move |event| received.borrow_mut().push(event.detail.clone())
            }),
        );

        let bindings = BindingSet::build(&ctx, &props, &[BindingSpec::output("item")]);
        bindings.output("item").expect("declared").emit("fresh");

        assert_eq!(props.value("item"), Some(json!("fresh")));
        assert_eq!(&*received.borrow(), &[json!("fresh")]);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn output_emit_without_a_callback_prop_still_rerenders() {
        let (ctx, renders) = context_counting_renders();
        let props = Props::new();

        let bindings = BindingSet::build(&ctx, &props, &[BindingSpec::output("item")]);
        bindings.output("item").expect("declared").emit(7);

        assert_eq!(props.value("item"), Some(json!(7)));
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn directions_do_not_cross() {
        let (ctx, _) = context_counting_renders();
        let props = Props::new();
        let bindings = BindingSet::build(
            &ctx,
            &props,
            &[BindingSpec::input("a"), BindingSpec::output("b")],
        );

        assert!(bindings.input("a").is_some());
        assert!(bindings.output("a").is_none());
        assert!(bindings.input("b").is_none());
        assert!(bindings.output("b").is_some());
    }
}
