use pretty_assertions::assert_eq;

use super::flavor;
use tidings::{Constant, Flag, Source as _};

#[test]
fn constant_source_debug() {
    let source = flavor::constant(123);
    assert_eq!(format!("{source:?}"), "Constant(123)");
    assert_eq!(format!("{source:#?}"), "Constant(\n    123,\n)");
}

#[test]
fn constant_source_usage() {
    let flag = Flag::new(false);
    let source = flavor::constant(123u64);
    let subscription = source.subscribe(flag.listener());
    assert!(!subscription.is_active());
    assert_eq!(source.snapshot(), 123);
    assert_eq!(source.snapshot(), 123);
    assert_eq!(flag.get_and_clear(), false);
}

#[test]
fn constant_into_dyn_source() {
    let constant: flavor::Constant<&str> = Constant::new("fixed");
    assert_eq!(constant.as_ref(), &"fixed");
    let source: flavor::DynSource<&str> = constant.into();
    assert_eq!(source.snapshot(), "fixed");
}
