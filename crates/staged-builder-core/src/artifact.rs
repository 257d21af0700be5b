use derive_more::Display;
use proc_macro2::TokenStream;
use quote::ToTokens;

///
/// ArtifactKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ArtifactKind {
    /// Stages module: family trait, capability trait, per-member traits and
    /// stage markers.
    #[display("interfaces")]
    Interfaces,

    /// The builder struct with its add methods and `build`.
    #[display("builder")]
    Builder,

    /// Factory function added to the target.
    #[display("factory")]
    Factory,
}

impl ArtifactKind {
    pub const ALL: [Self; 3] = [Self::Interfaces, Self::Builder, Self::Factory];
}

///
/// Artifact
///
/// One generated unit, identified as `<Target>.<kind>`.
///

#[derive(Clone, Debug)]
pub struct Artifact {
    kind: ArtifactKind,
    ident: String,
    tokens: TokenStream,
}

impl Artifact {
    #[must_use]
    pub fn new(target: &str, kind: ArtifactKind, tokens: TokenStream) -> Self {
        Self {
            kind,
            ident: format!("{target}.{kind}"),
            tokens,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    #[must_use]
    pub fn render(&self) -> RenderedArtifact {
        RenderedArtifact {
            ident: self.ident.clone(),
            content: self.tokens.to_string(),
        }
    }
}

impl ToTokens for Artifact {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(self.tokens.clone());
    }
}

///
/// RenderedArtifact
///
/// Thread-safe text form of an artifact.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RenderedArtifact {
    pub ident: String,
    pub content: String,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn ident_joins_target_and_kind() {
        let idents: Vec<_> = ArtifactKind::ALL
            .iter()
            .map(|&kind| Artifact::new("Order", kind, TokenStream::new()).ident().to_string())
            .collect();

        assert_eq!(idents, ["Order.interfaces", "Order.builder", "Order.factory"]);
    }

    #[test]
    fn render_keeps_token_text() {
        let artifact = Artifact::new("Order", ArtifactKind::Factory, quote!(struct A;));
        let rendered = artifact.render();

        assert_eq!(rendered.ident, "Order.factory");
        assert_eq!(rendered.content, quote!(struct A;).to_string());
        assert_eq!(artifact.to_token_stream().to_string(), rendered.content);
    }
}
