use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashSet;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Expr, ImplItem, Item, ItemImpl, LitStr, Meta, Result as SynResult, Token, Type,
    parse::Parse, parse::ParseStream, parse_macro_input,
};

/// #[command] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as CommandAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut imp = match input {
        Item::Impl(i) => i,
        other => {
            return syn::Error::new(other.span(), "#[command] only on `impl Command for X` blocks")
                .to_compile_error()
                .into();
        }
    };

    match expand_impl(cfg, &mut imp) {
        Ok(out) => TokenStream::from(out),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_impl(cfg: CommandAttrConfig, imp: &mut ItemImpl) -> SynResult<proc_macro2::TokenStream> {
    if imp.trait_.is_none() {
        return Err(syn::Error::new(
            imp.span(),
            "#[command] requires a trait impl, e.g., impl Command for Save { .. }",
        ));
    }

    if !imp.generics.params.is_empty() {
        return Err(syn::Error::new(
            imp.generics.span(),
            "#[command] does not support generic command types",
        ));
    }

    let ident = match &*imp.self_ty {
        Type::Path(tp) if tp.qself.is_none() => {
            let last = tp
                .path
                .segments
                .last()
                .ok_or_else(|| syn::Error::new(tp.span(), "expected a type name"))?;
            if !last.arguments.is_empty() {
                return Err(syn::Error::new(
                    last.arguments.span(),
                    "#[command] does not support generic command types",
                ));
            }
            last.ident.clone()
        }
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[command] supports only named types, e.g., impl Command for Save",
            ));
        }
    };

    // 动作名由宏统一提供，禁止重复定义
    let has_names_fn = imp.items.iter().any(|it| match it {
        ImplItem::Fn(f) => f.sig.ident == "action_names",
        _ => false,
    });
    if has_names_fn {
        return Err(syn::Error::new(
            imp.span(),
            "`action_names` is generated by #[command(names = [...])]; remove the hand-written one",
        ));
    }

    imp.items.push(syn::parse_quote! {
        fn action_names(&self) -> ::cmdr_core::ActionNames {
            <Self as ::cmdr_core::CommandType>::action_names()
        }
    });

    let self_ty = &imp.self_ty;
    let ident_str = ident.to_string();
    let names = &cfg.names;
    let reg_ident = format_ident!("__CMDR_COMMAND_{}", ident_str.to_uppercase());

    let descriptor = if cfg.manual {
        quote! {
            ::cmdr_core::CommandDescriptor::without_constructor(
                <#self_ty as ::cmdr_core::CommandType>::TYPE_NAME,
            )
        }
    } else {
        quote! {
            ::cmdr_core::CommandDescriptor::command(
                <#self_ty as ::cmdr_core::CommandType>::TYPE_NAME,
                ::cmdr_core::instantiate::<#self_ty>,
            )
        }
    };

    Ok(quote! {
        #imp

        impl ::cmdr_core::CommandType for #self_ty {
            const TYPE_NAME: &'static str =
                ::core::concat!(module_path!(), "::", #ident_str);
            const ACTION_NAMES: &'static [&'static str] = &[#(#names),*];
        }

        #[::cmdr_core::__private::linkme::distributed_slice(::cmdr_core::COMMANDS)]
        #[linkme(crate = ::cmdr_core::__private::linkme)]
        #[doc(hidden)]
        static #reg_ident: ::cmdr_core::CommandDescriptor = #descriptor;
    })
}

// 解析 command 宏参数：names = ["..", ..]、manual
struct CommandAttrConfig {
    names: Vec<LitStr>,
    manual: bool,
}

impl Parse for CommandAttrConfig {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut names: Option<Vec<LitStr>> = None;
        let mut manual = false;

        let metas: Punctuated<Meta, Token![,]> = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in metas.into_iter() {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("names") => {
                    if names.is_some() {
                        return Err(syn::Error::new(nv.path.span(), "duplicate key 'names' in attribute"));
                    }
                    names = Some(parse_names(&nv.value)?);
                }
                Meta::Path(p) if p.is_ident("manual") => {
                    if manual {
                        return Err(syn::Error::new(p.span(), "duplicate key 'manual' in attribute"));
                    }
                    manual = true;
                }
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "unknown key; expected 'names' | 'manual'",
                    ));
                }
            }
        }

        let names = names.ok_or_else(|| {
            syn::Error::new(
                input.span(),
                "missing 'names'; expected #[command(names = [\"...\"])]",
            )
        })?;

        Ok(Self { names, manual })
    }
}

fn parse_names(value: &Expr) -> SynResult<Vec<LitStr>> {
    let arr = match value {
        Expr::Array(arr) => arr,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "expected an array of string literals for 'names'",
            ));
        }
    };

    if arr.elems.is_empty() {
        return Err(syn::Error::new(arr.span(), "a command needs at least one action name"));
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(arr.elems.len());
    for elem in arr.elems.iter() {
        let lit = match elem {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) => lit.clone(),
            other => {
                return Err(syn::Error::new(other.span(), "expected string literal"));
            }
        };
        if lit.value().is_empty() {
            return Err(syn::Error::new(lit.span(), "action name must not be empty"));
        }
        if !seen.insert(lit.value()) {
            return Err(syn::Error::new(lit.span(), "duplicate action name"));
        }
        out.push(lit);
    }
    Ok(out)
}
