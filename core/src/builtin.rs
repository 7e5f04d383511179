//! Native functions available in every program.
use crate::{
    eval::{Context, Error},
    object::{Builtin, Object},
};
use std::rc::Rc;

static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: len,
    },
    Builtin {
        name: "first",
        func: first,
    },
    Builtin {
        name: "last",
        func: last,
    },
    Builtin {
        name: "rest",
        func: rest,
    },
    Builtin {
        name: "push",
        func: push,
    },
    Builtin {
        name: "puts",
        func: puts,
    },
];

/// Get the builtin named `name`.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name).copied()
}

fn single<'a>(args: &'a [Object]) -> Result<&'a Object, Error> {
    match args {
        [arg] => Ok(arg),
        _ => Err(Error::WrongArgumentCount {
            got: args.len(),
            want: 1,
        }),
    }
}

fn array_arg<'a>(builtin: &'static str, arg: &'a Object) -> Result<&'a Rc<Vec<Object>>, Error> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(Error::ArgumentNotArray {
            builtin,
            got: other.kind(),
        }),
    }
}

fn len(args: &[Object], _ctx: &mut dyn Context) -> Result<Object, Error> {
    let count = match single(args)? {
        Object::String(value) => value.chars().count(),
        Object::Array(elements) => elements.len(),
        other => {
            return Err(Error::UnsupportedArgument {
                builtin: "len",
                got: other.kind(),
            });
        }
    };

    Ok(Object::Integer(count as i64))
}

fn first(args: &[Object], _ctx: &mut dyn Context) -> Result<Object, Error> {
    let elements = array_arg("first", single(args)?)?;
    Ok(elements.first().cloned().unwrap_or(Object::NULL))
}

fn last(args: &[Object], _ctx: &mut dyn Context) -> Result<Object, Error> {
    let elements = array_arg("last", single(args)?)?;
    Ok(elements.last().cloned().unwrap_or(Object::NULL))
}

/// New array of all but the first element.
fn rest(args: &[Object], _ctx: &mut dyn Context) -> Result<Object, Error> {
    let elements = array_arg("rest", single(args)?)?;
    if elements.is_empty() {
        return Ok(Object::NULL);
    }

    Ok(Object::array(elements[1..].to_vec()))
}

/// New array with the value appended.
/// The original array is left unchanged.
fn push(args: &[Object], _ctx: &mut dyn Context) -> Result<Object, Error> {
    let [array, value] = args else {
        return Err(Error::WrongArgumentCount {
            got: args.len(),
            want: 2,
        });
    };

    let elements = array_arg("push", array)?;
    let mut pushed = Vec::with_capacity(elements.len() + 1);
    pushed.extend(elements.iter().cloned());
    pushed.push(value.clone());
    Ok(Object::array(pushed))
}

fn puts(args: &[Object], ctx: &mut dyn Context) -> Result<Object, Error> {
    for arg in args {
        ctx.puts(&arg.inspect());
    }

    Ok(Object::NULL)
}
