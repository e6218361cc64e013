//! `#[pg_test]`: runs a test against one or more live Postgres servers, each
//! with a freshly created database that is dropped again when the test passes.
//!
//! ```ignore
//! #[pg_test(arg(postgres = 15))]
//! async fn lists_tables(helper: &TestHelper) { /* ... */ }
//! ```

use darling::ast::NestedMeta;
use darling::FromMeta;
use proc_macro::{Span, TokenStream};
use quote::quote;
use syn::{parse_macro_input, ItemFn};

#[derive(Debug, FromMeta)]
enum TestServer {
    Postgres(i32),
}

impl TestServer {
    fn module_part_name(&self) -> String {
        match self {
            TestServer::Postgres(v) => format!("postgres_{}", v),
        }
    }

    /// Each supported major version listens on `5400 + version`.
    fn port(&self) -> Result<u16, darling::Error> {
        match self {
            TestServer::Postgres(v @ 12..=16) => Ok(5400 + *v as u16),
            TestServer::Postgres(v) => Err(darling::Error::custom(format!(
                "No test server for postgres {}, expected 12 to 16",
                v
            ))),
        }
    }
}

#[derive(Debug, FromMeta)]
struct TestArgs {
    #[darling(multiple, rename = "arg")]
    servers: Vec<TestServer>,
}

impl TestArgs {
    fn test_name_prefix(&self) -> String {
        self.servers
            .iter()
            .map(TestServer::module_part_name)
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn error(message: &str) -> TokenStream {
    TokenStream::from(darling::Error::custom(message).write_errors())
}

#[proc_macro_attribute]
pub fn pg_test(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let function_name = &input.sig.ident;

    let attr_args = match NestedMeta::parse_meta_list(args.into()) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(darling::Error::from(e).write_errors()),
    };

    let args = match TestArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    if input.sig.inputs.len() != args.servers.len() {
        return error(&format!(
            "Function is declared to have {} args, however attribute defines {} servers",
            input.sig.inputs.len(),
            args.servers.len()
        ));
    }

    let mut helpers_create = Vec::with_capacity(args.servers.len());
    let mut helpers_stop = Vec::with_capacity(args.servers.len());
    let mut arg_idents = Vec::with_capacity(args.servers.len());

    for (server, input) in args.servers.iter().zip(input.sig.inputs.iter()) {
        let port = match server.port() {
            Ok(p) => p,
            Err(e) => return TokenStream::from(e.write_errors()),
        };

        let arg_ident = match input {
            syn::FnArg::Typed(t) => match &*t.pat {
                syn::Pat::Ident(i) => &i.ident,
                _ => return error("Only simple identifiers are supported as function arguments"),
            },
            _ => return error("Only simple identifiers are supported as function arguments"),
        };
        arg_idents.push(arg_ident.clone());

        let helper_name = arg_ident.to_string();

        helpers_create.push(quote! {
            let #arg_ident =
                crate::test_helpers::get_test_helper_on_port(#helper_name, #port).await;
        });
        helpers_stop.push(quote! {
            #arg_ident.stop().await;
        });
    }
    helpers_stop.reverse();

    let test_function_name = syn::Ident::new(
        &format!("{}_{}", args.test_name_prefix(), function_name),
        Span::call_site().into(),
    );

    let invoke = if input.sig.asyncness.is_some() {
        quote! { #function_name(#(&#arg_idents),*).await; }
    } else {
        quote! { #function_name(#(&#arg_idents),*); }
    };

    TokenStream::from(quote! {
        #input

        #[tokio::test]
        async fn #test_function_name() {
            #(#helpers_create)*

            #invoke

            #(#helpers_stop)*
        }
    })
}
