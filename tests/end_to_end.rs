/// End-to-end scenarios combining registration, matching and injection.

use autowire::{inject, CallArgs, Function, Injectable, Registry, Ty, TypeDesc, Value};
use std::sync::Arc;

trait Animal: Send + Sync {
    fn sound(&self) -> &'static str;
}

#[derive(Default)]
struct Dog;
impl Animal for Dog {
    fn sound(&self) -> &'static str {
        "woof"
    }
}

#[derive(Default)]
struct Cat;
impl Animal for Cat {
    fn sound(&self) -> &'static str {
        "meow"
    }
}

#[derive(Default)]
struct Bird;
impl Animal for Bird {
    fn sound(&self) -> &'static str {
        "tweet"
    }
}

fn animal() -> Ty {
    Ty::of::<dyn Animal>()
}

fn zoo() -> Registry {
    let registry = Registry::new();
    Injectable::new(Ty::class::<dyn Animal>().abstract_class()).register_in(&registry);
    Injectable::new(Ty::class::<Dog>().implements::<dyn Animal>(animal(), |a| a).default_constructor())
        .singleton(true)
        .register_in(&registry);
    Injectable::new(Ty::class::<Cat>().implements::<dyn Animal>(animal(), |a| a).default_constructor())
        .register_in(&registry);
    Injectable::new(Ty::class::<Bird>().implements::<dyn Animal>(animal(), |a| a).default_constructor())
        .register_in(&registry);
    registry
}

#[test]
fn test_list_of_abstract_base_collects_concrete_subclasses() {
    let registry = zoo();
    let chorus = Function::builder("chorus")
        .param("animals", TypeDesc::list_of(animal()))
        .returns(TypeDesc::plain::<Vec<&'static str>>())
        .build(|args| {
            let sounds: Vec<&'static str> = args
                .get_all::<dyn Animal>("animals")?
                .iter()
                .map(|a| a.sound())
                .collect();
            Ok(Value::new(sounds))
        });

    let chorus = inject(chorus, &registry).unwrap();
    let out = chorus.call(CallArgs::new()).unwrap();
    assert_eq!(*out.get::<Vec<&'static str>>().unwrap(), vec!["woof", "meow", "tweet"]);
}

#[test]
fn test_singleton_and_transient_parameters() {
    let registry = zoo();
    let f = Function::builder("f")
        .param("a", TypeDesc::plain::<Dog>())
        .param("b", TypeDesc::plain::<Dog>())
        .param("c", TypeDesc::plain::<Cat>())
        .param("d", TypeDesc::plain::<Cat>())
        .returns(TypeDesc::plain::<(bool, bool)>())
        .build(|args| {
            let same_dog = Arc::ptr_eq(&args.get::<Dog>("a")?, &args.get::<Dog>("b")?);
            let same_cat = Arc::ptr_eq(&args.get::<Cat>("c")?, &args.get::<Cat>("d")?);
            Ok(Value::new((same_dog, same_cat)))
        });

    let f = inject(f, &registry).unwrap();
    let out = f.call(CallArgs::new()).unwrap();
    assert_eq!(*out.get::<(bool, bool)>().unwrap(), (true, false));
}

#[test]
fn test_registries_are_isolated() {
    let first = Registry::new();
    let second = Registry::new();
    Injectable::new(Ty::class::<Dog>().default_constructor())
        .singleton(true)
        .register_in(&first);

    assert!(first.get::<Dog>().is_ok());
    assert!(second.get::<Dog>().is_err());
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());

    Injectable::new(Ty::class::<Dog>().default_constructor())
        .singleton(true)
        .register_in(&second);
    let a = first.get::<Dog>().unwrap();
    let b = second.get::<Dog>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_clones_share_one_registry() {
    let registry = Registry::new();
    let handle = registry.clone();
    Injectable::new(Ty::class::<Dog>().default_constructor()).register_in(&handle);

    assert!(Registry::ptr_eq(&registry, &handle));
    assert!(registry.contains("Dog"));
}

#[test]
fn test_types_and_instances_side_by_side() {
    let registry = zoo();
    let survey = Function::builder("survey")
        .param("kinds", TypeDesc::list_of(TypeDesc::type_of(animal())))
        .param("pet", TypeDesc::plain::<Dog>())
        .returns(TypeDesc::plain::<usize>())
        .build(|args| {
            let kinds = args.value("kinds").and_then(Value::as_list).map_or(0, <[Value]>::len);
            args.get::<Dog>("pet")?;
            Ok(Value::new(kinds))
        });

    let survey = inject(survey, &registry).unwrap();
    let out = survey.call(CallArgs::new()).unwrap();
    // The abstract base is a type too
    assert_eq!(*out.get::<usize>().unwrap(), 4);
}

#[test]
fn test_factory_functions_are_callable_dependencies() {
    let registry = zoo();
    let adopt = Function::builder("adopt")
        .returns(animal())
        .build(|_| Ok(Value::Instance(autowire::Instance::new(
            Ty::class::<Bird>().implements::<dyn Animal>(animal(), |a| a).build(),
            Bird,
        ))));
    Injectable::new(adopt).register_in(&registry);

    let visit = Function::builder("visit")
        .param("adopt", TypeDesc::callable([], animal()))
        .returns(TypeDesc::plain::<&'static str>())
        .build(|args| {
            let pet = args.function("adopt")?.call(autowire::Arguments::new())?;
            let pet = pet.get::<dyn Animal>().ok_or("not an animal")?;
            Ok(Value::new(pet.sound()))
        });

    let visit = inject(visit, &registry).unwrap();
    let out = visit.call(CallArgs::new()).unwrap();
    assert_eq!(*out.get::<&'static str>().unwrap(), "tweet");
}

#[test]
fn test_list_requests_never_cross_registries() {
    let a = Registry::new();
    let b = Registry::new();
    Injectable::new(Ty::class::<Dog>().implements::<dyn Animal>(animal(), |x| x).default_constructor())
        .register_in(&a);
    Injectable::new(Ty::class::<Cat>().implements::<dyn Animal>(animal(), |x| x).default_constructor())
        .register_in(&b);

    let sounds = |registry: &Registry| -> Vec<&'static str> {
        registry.get_all::<dyn Animal>().unwrap().iter().map(|x| x.sound()).collect()
    };
    assert_eq!(sounds(&a), vec!["woof"]);
    assert_eq!(sounds(&b), vec!["meow"]);
}

#[test]
fn test_one_subject_singleton_in_one_registry_transient_in_another() {
    let shared = Registry::new();
    let fresh = Registry::new();
    let subject = Injectable::new(Ty::class::<Dog>().default_constructor())
        .singleton(true)
        .register_in(&shared);
    Injectable::new(subject).name("transient-dog").register_in(&fresh);

    let cached = shared.get::<Dog>().unwrap();
    assert!(Arc::ptr_eq(&cached, &shared.get::<Dog>().unwrap()));

    let (x, y) = (fresh.get::<Dog>().unwrap(), fresh.get::<Dog>().unwrap());
    assert!(!Arc::ptr_eq(&x, &y));
    assert!(!Arc::ptr_eq(&x, &cached));
}
