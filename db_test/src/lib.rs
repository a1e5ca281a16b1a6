use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, Signature, Type};

/// Run an async test against a real MongoDB database, injecting a
/// `crate::model::store::MongoStore` and/or the [`mongodb::Database`] behind
/// it.
///
/// Every test gets a freshly indexed database of its own, which is dropped
/// WHETHER OR NOT the test completes by passing, failing or otherwise
/// panicking. If the test panics, the panic is "rethrown" after cleanup.
///
/// These tests need a reachable MongoDB server at the configured `db_uri`
/// (`Rocket.toml` or `ROCKET_DB_URI`), so they are ignored by default. Run
/// them with `cargo test -- --ignored`.
///
/// Note: this attribute requires `crate::database_for_test` to exist.
#[proc_macro_attribute]
pub fn db_test(_: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    quote! {
        #[test]
        #[ignore = "needs a MongoDB server"]
        fn #name() {
            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("db-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let db = crate::database_for_test().await;
                #[allow(unused_variables)]
                let store = crate::model::store::MongoStore::from_db(&db);

                let result = rocket::futures::FutureExt::catch_unwind(
                    std::panic::AssertUnwindSafe(#new_name(#(#test_args),*)),
                )
                .await;

                db.drop(None).await.unwrap();

                if let Err(cause) = result {
                    std::panic::resume_unwind(cause);
                }
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_store = false;
    let mut has_db = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "MongoStore" && !has_store {
                            has_store = true;
                            args.push(quote! { store });
                            continue;
                        } else if type_ident == "Database" && !has_db {
                            has_db = true;
                            args.push(quote! { db.clone() });
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected at most one each of `store_ident: MongoStore` and `db_ident: Database`",
        ));
    }

    Ok(args)
}
