//! Page content. Navigation is boosted by htmx and small interactions are written in hyperscript.

/// The pages of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    Work,
    Support,
    NotFound,
}

impl Page {
    /// Pages reachable through navigation, in menu order.
    pub const NAVIGABLE: [Self; 3] = [Self::Landing, Self::Work, Self::Support];

    /// Resolves the slug used by `/partials/{page}`.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "landing" => Some(Self::Landing),
            "work" => Some(Self::Work),
            "support" => Some(Self::Support),
            _ => None,
        }
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Work => "/work",
            Self::Support => "/support",
            Self::NotFound => "/404",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Landing => "Home",
            Self::Work => "Work",
            Self::Support => "Support",
            Self::NotFound => "Not Found",
        }
    }

    /// Page specific description; `None` falls back to the site description.
    pub const fn description(self) -> Option<&'static str> {
        match self {
            Self::Landing => None,
            Self::Work => Some("Selected projects and open source work."),
            Self::Support => Some("Ways to get help and support the work."),
            Self::NotFound => Some("The requested page does not exist."),
        }
    }

    /// The `<main>` content of the page.
    pub const fn content(self) -> &'static str {
        match self {
            Self::Landing => LANDING,
            Self::Work => WORK,
            Self::Support => SUPPORT,
            Self::NotFound => NOT_FOUND,
        }
    }
}

const LANDING: &str = r##"<section class="hero">
  <h1>Immanent Tech</h1>
  <p>Small, dependable software for people and the places they live in.</p>
  <button type="button" class="button" _="on click toggle .hidden on #about then toggle @aria-expanded">
    More about us
  </button>
  <div id="about" class="hidden">
    <p>We build open source tools for home automation, desktop integration and the web.</p>
  </div>
</section>
<section class="cards">
  <a class="card" href="/work">See the work</a>
  <a class="card" href="/support">Get support</a>
</section>"##;

const WORK: &str = r##"<section>
  <h1>Work</h1>
  <ul class="projects">
    <li>
      <h2>Desktop Agent</h2>
      <p>A desktop agent exposing sensors and controls of a machine to Home Assistant.</p>
    </li>
    <li>
      <h2>www.immanent.tech</h2>
      <p>This site: server rendered pages enhanced with htmx and hyperscript.</p>
    </li>
  </ul>
</section>"##;

const SUPPORT: &str = r##"<section>
  <h1>Support</h1>
  <p>Found a bug or need a hand? Open an issue on the project tracker.</p>
  <details _="on toggle if me.open add .open to me else remove .open from me">
    <summary>Sponsoring</summary>
    <p>Sponsorships keep the projects maintained. Thank you!</p>
  </details>
</section>"##;

const NOT_FOUND: &str = r##"<section>
  <h1>Not Found</h1>
  <p>Sorry, that page does not exist.</p>
  <a class="button" href="/">Back to the home page</a>
</section>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_resolve_navigable_pages_only() {
        assert_eq!(Page::from_slug("work"), Some(Page::Work));
        assert_eq!(Page::from_slug("landing"), Some(Page::Landing));
        assert_eq!(Page::from_slug("404"), None);
        assert_eq!(Page::from_slug("Work"), None);
    }

    #[test]
    fn pages_use_hyperscript() {
        assert!(Page::Landing.content().contains(r#"_="on click"#));
    }
}
