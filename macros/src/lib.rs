extern crate proc_macro;

mod configure;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Lit, LitInt, LitStr, Token};

struct ConfigArgs {
    key: LitStr,
    default: Option<Lit>,
}

impl Parse for ConfigArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key: LitStr = input.parse()?;
        let default = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                None
            } else {
                let default = input.parse()?;
                if input.peek(Token![,]) {
                    input.parse::<Token![,]>()?;
                }
                Some(default)
            }
        } else {
            None
        };
        if !input.is_empty() {
            return Err(input.error("expected `config!(\"key\")` or `config!(\"key\", default)`"));
        }
        Ok(Self { key, default })
    }
}

/// Expands to a value from `.rain-node/config.toml`.
///
/// `config!("key")` yields a string literal. With a default,
/// `config!("key", 10000)`, the default is used when the key is missing and
/// an integer default makes the configured value an integer literal too.
/// Without a default a missing key is a compile error, unless the `CI`
/// environment variable is set, in which case it expands to `"CI"`.
#[proc_macro]
pub fn config(input: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(input as ConfigArgs);
    match expand(&args) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(args: &ConfigArgs) -> syn::Result<proc_macro2::TokenStream> {
    let key = args.key.value();
    match (configure::lookup(&key), &args.default) {
        (Some(value), Some(Lit::Int(_))) => {
            let parsed: u64 = value.trim().parse().map_err(|_| {
                syn::Error::new(
                    args.key.span(),
                    format!("`{}` is configured as `{}`, expected an integer", key, value),
                )
            })?;
            let lit = LitInt::new(&parsed.to_string(), Span::call_site());
            Ok(quote!(#lit))
        }
        (Some(value), _) => {
            let lit = LitStr::new(value, Span::call_site());
            Ok(quote!(#lit))
        }
        (None, Some(default)) => Ok(quote!(#default)),
        (None, None) if configure::is_ci() => {
            let lit = LitStr::new(configure::CI_ENV_VAR, Span::call_site());
            Ok(quote!(#lit))
        }
        (None, None) => Err(syn::Error::new(
            args.key.span(),
            format!("`{}` missing from ~/{}", key, configure::CONFIG_FILE),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_only() {
        let args: ConfigArgs = syn::parse_str("\"wifi-ssid\"").unwrap();
        assert_eq!("wifi-ssid", args.key.value());
        assert!(args.default.is_none());
    }

    #[test]
    fn parses_key_with_default() {
        let args: ConfigArgs = syn::parse_str("\"sample-period-ms\", 10000").unwrap();
        assert_eq!("sample-period-ms", args.key.value());
        assert!(matches!(args.default, Some(Lit::Int(_))));

        let args: ConfigArgs = syn::parse_str("\"hostname\", \"localhost\",").unwrap();
        assert!(matches!(args.default, Some(Lit::Str(_))));
    }

    #[test]
    fn rejects_extra_arguments() {
        assert!(syn::parse_str::<ConfigArgs>("\"a\", 1, 2").is_err());
        assert!(syn::parse_str::<ConfigArgs>("key").is_err());
    }

    #[test]
    fn missing_key_uses_default() {
        let args: ConfigArgs = syn::parse_str("\"surely-not-configured-key\", 42").unwrap();
        assert_eq!("42", expand(&args).unwrap().to_string());
    }
}
