//! Table-driven parsing of `Field = value` blocks.
//!
//! A block is a run of lines, each starting with a field name, terminated by a line whose first
//! token is `End`. Each field name maps to a parser that reads the rest of the line into the
//! target.

use phf::phf_map;

use super::ConfigLoader;
use crate::context::{StateContext, StateContextConfig};
use crate::error::ConfigError;
use crate::symbols::{CaseMode, Symbol, SymbolTableConfig};

pub const BLOCK_END: &str = "End";

pub type FieldParser<T, C> = fn(&mut ConfigLoader<'_>, &mut C, &mut T) -> Result<(), ConfigError>;

/// One entry of a field table: the field's name and the parser for its value.
pub struct FieldParse<T, C = StateContext> {
    pub name: &'static str,
    pub parse: FieldParser<T, C>,
}

/// Parses lines into `target` until the block's `End`.
///
/// Blank and comment-only lines are skipped. A field name missing from `fields` aborts the block
/// with `ConfigError::UnknownToken`.
pub fn parse_block<T, C>(
    loader: &mut ConfigLoader<'_>,
    context: &mut C,
    target: &mut T,
    fields: &[FieldParse<T, C>],
) -> Result<(), ConfigError> {
    loop {
        if !loader.read_line()? {
            return Err(loader.unexpected_end());
        }
        let token = match loader.next_token_opt() {
            Some(token) => token,
            None => continue,
        };
        if token.eq_ignore_ascii_case(BLOCK_END) {
            return Ok(());
        }
        let field = fields
            .iter()
            .find(|field| field.name == token)
            .ok_or_else(|| loader.unknown_token(&token))?;
        (field.parse)(loader, context, target)?;
    }
}

static BOOL_WORDS: phf::Map<&'static str, bool> = phf_map! {
    "yes" => true,
    "no" => false,
    "true" => true,
    "false" => false,
};

pub fn parse_int(loader: &mut ConfigLoader<'_>) -> Result<i32, ConfigError> {
    let token = loader.next_token()?;
    token.parse().map_err(|_| loader.invalid_value(&token))
}

pub fn parse_unsigned(loader: &mut ConfigLoader<'_>) -> Result<u32, ConfigError> {
    let token = loader.next_token()?;
    token.parse().map_err(|_| loader.invalid_value(&token))
}

pub fn parse_real(loader: &mut ConfigLoader<'_>) -> Result<f32, ConfigError> {
    let token = loader.next_token()?;
    lexical_core::parse::<f32>(token.as_bytes()).map_err(|_| loader.invalid_value(&token))
}

/// `yes`/`no`/`true`/`false`, in any case.
pub fn parse_bool(loader: &mut ConfigLoader<'_>) -> Result<bool, ConfigError> {
    let token = loader.next_token()?;
    BOOL_WORDS
        .get(token.to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| loader.invalid_value(&token))
}

pub fn parse_ascii_string(loader: &mut ConfigLoader<'_>) -> Result<String, ConfigError> {
    let token = loader.next_token()?;
    if !token.is_ascii() {
        return Err(loader.invalid_value(&token));
    }
    Ok(token)
}

pub fn parse_quoted_string(loader: &mut ConfigLoader<'_>) -> Result<String, ConfigError> {
    loader.next_quoted_string()
}

/// Interns the next token into the context's symbol table.
pub fn parse_symbol(
    loader: &mut ConfigLoader<'_>,
    context: &mut StateContext,
) -> Result<Symbol, ConfigError> {
    let token = loader.next_token()?;
    Ok(context.symbols_mut().intern(&token, CaseMode::Sensitive))
}

fn symbol_table_fields() -> [FieldParse<SymbolTableConfig, ()>; 2] {
    [
        FieldParse {
            name: "BucketCount",
            parse: |loader, _, config| {
                let count = parse_unsigned(loader)?;
                if count == 0 {
                    return Err(loader.invalid_value("0"));
                }
                config.bucket_count = count as usize;
                Ok(())
            },
        },
        FieldParse {
            name: "ChainThreshold",
            parse: |loader, _, config| {
                config.chain_threshold = parse_unsigned(loader)? as usize;
                Ok(())
            },
        },
    ]
}

/// Reads session settings from the open source. Settings not mentioned keep their defaults.
///
/// ```text
/// SymbolTable
///   BucketCount = 8191
///   ChainThreshold = 3
/// End
/// ```
pub fn parse_context_config(
    loader: &mut ConfigLoader<'_>,
) -> Result<StateContextConfig, ConfigError> {
    let mut config = StateContextConfig::default();
    while loader.read_line()? {
        let block = match loader.next_token_opt() {
            Some(block) => block,
            None => continue,
        };
        match block.as_str() {
            "SymbolTable" => {
                parse_block(loader, &mut (), &mut config.symbols, &symbol_table_fields())?
            }
            _ => return Err(loader.unknown_token(&block)),
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct UnitTemplate {
        name: Symbol,
        display_name: String,
        armor: i32,
        speed: f32,
        amphibious: bool,
    }

    fn unit_fields() -> Vec<FieldParse<UnitTemplate>> {
        vec![
            FieldParse {
                name: "Name",
                parse: |loader, context, unit| {
                    unit.name = parse_symbol(loader, context)?;
                    Ok(())
                },
            },
            FieldParse {
                name: "DisplayName",
                parse: |loader, _, unit| {
                    unit.display_name = parse_quoted_string(loader)?;
                    Ok(())
                },
            },
            FieldParse {
                name: "Armor",
                parse: |loader, _, unit| {
                    unit.armor = parse_int(loader)?;
                    Ok(())
                },
            },
            FieldParse {
                name: "Speed",
                parse: |loader, _, unit| {
                    unit.speed = parse_real(loader)?;
                    Ok(())
                },
            },
            FieldParse {
                name: "Amphibious",
                parse: |loader, _, unit| {
                    unit.amphibious = parse_bool(loader)?;
                    Ok(())
                },
            },
        ]
    }

    fn parse_unit(text: &str, context: &mut StateContext) -> Result<UnitTemplate, ConfigError> {
        let mut loader = ConfigLoader::new();
        loader.open_str("units.ini", text)?;
        let mut unit = UnitTemplate::default();
        parse_block(&mut loader, context, &mut unit, &unit_fields())?;
        Ok(unit)
    }

    #[test]
    fn test_parse_block() {
        let mut context = StateContext::default();
        let text = "  Name = Tank\n\n  DisplayName = \"Heavy Tank\" ; shown in tooltips\n  Armor = -3\n  Speed = 12.5\n  Amphibious = Yes\nEND\n";
        let unit = parse_unit(text, &mut context).unwrap();
        assert_eq!(
            unit,
            UnitTemplate {
                name: Symbol::from_key(1),
                display_name: "Heavy Tank".to_owned(),
                armor: -3,
                speed: 12.5,
                amphibious: true,
            }
        );
        assert_eq!(context.resolve(unit.name), Some("Tank"));
    }

    #[test]
    fn test_unknown_field() {
        let mut context = StateContext::default();
        match parse_unit("Armor = 1\nTurretCount = 2\nEnd", &mut context) {
            Err(ConfigError::UnknownToken { token, file, line }) => {
                assert_eq!(token, "TurretCount");
                assert_eq!(file, "units.ini");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values() {
        let mut context = StateContext::default();
        for text in &["Armor = lots\nEnd", "Speed = fast\nEnd", "Amphibious = maybe\nEnd"] {
            match parse_unit(text, &mut context) {
                Err(ConfigError::InvalidValue { line: 1, .. }) => (),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn test_missing_end() {
        let mut context = StateContext::default();
        match parse_unit("Armor = 1\n", &mut context) {
            Err(ConfigError::UnexpectedEnd { line: 1, .. }) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_context_config() {
        let mut loader = ConfigLoader::new();
        loader
            .open_str(
                "session.ini",
                "; session settings\nSymbolTable\n  BucketCount = 8191\nEnd\n",
            )
            .unwrap();
        let config = parse_context_config(&mut loader).unwrap();
        assert_eq!(config.symbols.bucket_count, 8191);
        assert_eq!(config.symbols.chain_threshold, 3);
    }

    #[test]
    fn test_context_config_rejects_unknown_block() {
        let mut loader = ConfigLoader::new();
        loader.open_str("session.ini", "Weather\nEnd\n").unwrap();
        match parse_context_config(&mut loader) {
            Err(ConfigError::UnknownToken { token, .. }) => assert_eq!(token, "Weather"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
