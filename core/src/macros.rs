/// Implements a basic `Debug` trait for types using their type name.
///
/// Useful for types wrapping closures, where the internal structure cannot
/// be exposed.
macro_rules! impl_debug {
    ($ty:ty) => {
        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(core::any::type_name::<Self>())
            }
        }
    };
}

/// Assembles a child list for [`h`](crate::vnode::h) or
/// [`fragment`](crate::vnode::fragment) from heterogeneous values.
///
/// Accepts anything convertible into a [`Child`](crate::vnode::Child):
/// nodes, vectors of nodes (flattened one level), strings, numbers, and
/// bools.
///
/// ```ignore
/// let node = h("ul", Props::new(), children![items, h("li", Props::new(), children!["tail"])]);
/// ```
#[macro_export]
macro_rules! children {
    () => {
        $crate::vnode::Children::new()
    };
    ($($child:expr),+ $(,)?) => {{
        let mut children = $crate::vnode::Children::new();
        $(children.push($crate::vnode::Child::from($child));)+
        children
    }};
}

/// Builds a [`Props`](crate::props::Props) map from `key => value` pairs.
///
/// Values can be anything convertible into a
/// [`PropValue`](crate::props::PropValue): data values or event handlers.
///
/// ```ignore
/// let props = props! {
///     "class" => "item",
///     "onClick" => Handler::new(|_| {}),
/// };
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::props::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let props = $crate::props::Props::new();
        $(props.insert($key, $value);)+
        props
    }};
}
