use prime_traits::{
    config::RuntimeConfig,
    diagnostics::{emit_type_error, report_config_error, report_runtime_error},
    language::parser::parse_type,
    runtime::{
        context::CallContext,
        dictionary::Dictionary,
        dispatch::MEMPTY,
        traits::{OperatorMap, TraitName, TypeKey},
        Interpreter,
    },
};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Usage: prime-traits [--config <file.toml>] <command>

Commands:
  instances                      list every registered instance
  dictionary <Trait> <Type>      show the dictionary bound as Trait[Type]
  operators                      list infix operators and their traits
  resolve <Trait> <type-expr>    resolve the instance a type witness selects";

fn main() {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config_path = match take_flag(&mut args, "--config") {
        Ok(path) => path,
        Err(message) => usage_error(&message),
    };

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(()) => process::exit(1),
    };
    setup_logging(config.log_filter());

    let interp = match Interpreter::with_config(config) {
        Ok(interp) => interp,
        Err(err) => {
            report_runtime_error(&err);
            process::exit(1);
        }
    };

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["instances"] => {
            list_instances(&interp);
            Ok(())
        }
        ["dictionary", trait_name, type_name] => show_dictionary(&interp, trait_name, type_name),
        ["operators"] => {
            list_operators();
            Ok(())
        }
        ["resolve", trait_name, rest @ ..] if !rest.is_empty() => {
            resolve(&interp, trait_name, &rest.join(" "))
        }
        _ => usage_error("unknown or incomplete command"),
    };
    if result.is_err() {
        process::exit(1);
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}\n\n{USAGE}");
    process::exit(2);
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> Result<Option<PathBuf>, String> {
    let Some(pos) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err(format!("{flag} expects a path"));
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(PathBuf::from(value)))
}

fn load_config(path: Option<PathBuf>) -> Result<RuntimeConfig, ()> {
    let config = match path {
        Some(path) => RuntimeConfig::load(&path).map_err(|err| report_config_error(&err))?,
        None => RuntimeConfig::default(),
    };
    config
        .with_env_overrides()
        .map_err(|err| report_config_error(&err))
}

fn setup_logging(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|err| {
        eprintln!("warning: ignoring log filter `{directives}`: {err}");
        EnvFilter::new("warn")
    });
    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(true);
    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

fn parse_trait(name: &str) -> Result<TraitName, ()> {
    TraitName::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = TraitName::ALL.iter().map(|t| t.as_str()).collect();
        eprintln!("Unknown trait `{name}`; expected one of {}", known.join(", "));
    })
}

fn list_instances(interp: &Interpreter) {
    for table in interp.registry().tables() {
        let methods: Vec<&str> = table.methods().map(|(name, _)| name).collect();
        println!(
            "{}[{}]: {}",
            table.trait_name(),
            table.type_key(),
            methods.join(", ")
        );
    }
}

fn print_dictionary(dictionary: &Dictionary, depth: usize) {
    let methods: Vec<&str> = dictionary.methods().map(|(name, _)| name).collect();
    println!(
        "{}{} {{ {} }}",
        "  ".repeat(depth),
        dictionary.name,
        methods.join(", ")
    );
    for parent in dictionary.supers() {
        print_dictionary(parent, depth + 1);
    }
}

fn show_dictionary(interp: &Interpreter, trait_name: &str, type_name: &str) -> Result<(), ()> {
    let trait_name = parse_trait(trait_name)?;
    let type_key = TypeKey::from_name(type_name);
    match interp.dictionary(trait_name, &type_key) {
        Some(dictionary) => {
            print_dictionary(&dictionary, 0);
            Ok(())
        }
        None => {
            eprintln!("No `{trait_name}` instance for `{type_key}`");
            Err(())
        }
    }
}

fn list_operators() {
    for token in OperatorMap::OPERATORS {
        let trait_name = OperatorMap::trait_for(token)
            .map(|t| t.to_string())
            .unwrap_or_default();
        match OperatorMap::method_for(token) {
            Some(binding) => println!("{token:<4} {trait_name:<12} {binding}"),
            None => println!("{token:<4} {trait_name:<12} (evaluator only)"),
        }
    }
}

fn resolve(interp: &Interpreter, trait_name: &str, source: &str) -> Result<(), ()> {
    let trait_name = parse_trait(trait_name)?;
    let ty = parse_type(source).map_err(|err| emit_type_error("<type>", &err))?;
    let ty = interp.expand_aliases(&ty);
    let Some(type_key) = TypeKey::of_type(&ty) else {
        eprintln!("`{ty}` has no constructor to resolve an instance for");
        return Err(());
    };
    let Some(dictionary) = interp.dictionary(trait_name, &type_key) else {
        eprintln!("No `{trait_name}` instance for `{type_key}`");
        return Err(());
    };
    print_dictionary(&dictionary, 0);
    if trait_name == TraitName::Monoid {
        let ctx = CallContext::new().with_type_witness(TraitName::Monoid, ty);
        let identity = interp
            .call(&ctx, MEMPTY.display_name(), Vec::new())
            .map_err(|err| report_runtime_error(&err))?;
        println!("mempty = {identity}");
    }
    Ok(())
}
