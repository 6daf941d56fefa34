//! HTML rendering for the item list and error views.
//!
//! Templates are registered under `.html` names, so tera escapes every
//! interpolated value.

use tera::{Context, Tera};

use crate::store::Item;

/// PNG favicon, base64-encoded, inlined as a data URI in the page head.
const FAVICON_BASE64: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAACAAAAAgCAYAAABzenr0AAAFWElEQVRYhb2Xa2wUVRTHL0SJiUaR",
    "KrRz7xRjU0lbin3Qbrc7d7tALbWw292dWVBUIEAJ9LVz7+5M0/CqQgPyKAJSUAgEQsRCuzuzCUiC",
    "fDBBfEQTE7+Y8MFEQrSJGonYBCt7/LCd7UqBLrD1JPNhd86d/2/O/M+ZuQg9YLhWoifsLAtLTNju",
    "an7+qQddP260R3yzW0959DUHGo5phv9IKOLzp56nKl5POblOGfm1RJ06NWPC6oC7TDOVS3pMidev",
    "cUFhaTnwPj/oMSWuGXJPEoAJmsTILScXgXLcmRHxsOHr0M3A3x2xAHTEArC21w2y/gropgIdsQDo",
    "MSUejsg7EEKTpCCxSWq2izLxBuVkyL766WmPJB4yfJv1mBK3xO93aIZyRTP83ZrhY97tL1+v7cwD",
    "ezte8EgANeHc2Dz9BajtzIP6zbPAs60YlF3l8OaBalhzdD60nV4EmiHfG8qUf9IM/37W75n7UAB2",
    "ll3p5GTYyUW411ETzoWGrgJY2lMBTccWQCjiGwOix5S4ZsqXw0ZjbRqyk/7zS1KFLfcDGAMUygX3",
    "O0Ww4hAFPuAdC2LIMW40ivdSpwxflDjmVBXKkkSSik84uQgVS/OhsLwEHM0z04bx7SiB5lOvJk3b",
    "EQuAbiq/c9PvQQghqgpllJNPnYycp5z0U04GKSNDEiNHR7G60GSJ4a22FS8Oz5lfBFJbbkKEkT+p",
    "SnZVB8UKiQm1DhVvoozEKSNjYDzbZkPrRw2jFTEDt9Wzni4nI9dS80bWD1areNGY8tiC0+dQjnsp",
    "JxckFW+oDs+YLgVn2CjDl21t0whlxEiAiT9KQbyYMvIJZSSeKrB0b2XSuLqpwGt7bQlhTm5TLn4j",
    "McFdzYS66pacmWn4JWFUieHBFJE/JDXbZZ13cFxFGf42FaKhqwBYf2MSwrejBKrbhca0BMeYRsXr",
    "JYa/pJzcogwzW3D6jDtzXF3oMQcjO1OrUbchH9jZBEQ46odl+2wPB4AQQpUtOMvBhNXj5UlBoZly",
    "cju1EqOPQ/4CwR0tmMkoCqApNCTolJGbqY/jjf32pDHDUe+SCREvX/vsM5ThyyMuh9QucWkzk/NC",
    "M+WvJwRA4qRj9K7JsMTJ95STIeu/tw46koOKR3wvZRyAqoLDMqCkYo4QQg6Gu5Ne2FKQ8lKTWzIO",
    "gBBClJHvRgD2IISQfV0WdjLyj5OL4AyJEI76E1Uw5A8nBkDFm0am5wcpUFesKlhTUovJsYyLOxhe",
    "QTn5zMlFoKqgpwAcsADWnaizBtP5jANILKeeMvKbk5ObEsPvJQG4uMkCWH9yoeWB4xkHSEDgg46g",
    "4LEHcxYmARjusQDUMx6rFYMTAnC3oIx85eQi1HbmgW4qoMeUuBpZVJD2BSpbcJakZrskRnwSI/W0",
    "LbuwfC16PJ21Dp49z2rNZfuqrA74PD1yVShzhXMveLYVDwd2z4XA7rng6S6G2s48oIz8RRm55FTF",
    "sCMozLrbejvLrnQy8RfrpRSOJD7x+YBn3rjiEhOW+d8tvcUHvHHdVK5qhnxON+U+3VTOa4Z8Ldjn",
    "huWHKLi3zoaaUG6cMvKDpIqHKSMaTXywnLP6f+HGfGjvc1vm6xlX3NH6nODeWjSkm/LVUNRbfrcc",
    "3u8p1Qz5fc1UboSjfmg6tgCW7KmAxW8XQt2GfKjbmA+N3cWw8rATNENO7CsMeV9XF5o8/t2rwqpV",
    "R1xxFvVWjpcbPln3ZCgqv64Z8se6qfx85/5CN5VhzZAv8qg3/b0D5aSp6XjtYNoLUqL1tEfgA+4q",
    "LearCUW95c1nXA++ea1ScwqW90oPBZCx8O8s7Q2cKZryf2j9C83yK5h/LyR6AAAAAElFTkSuQmCC",
);

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>AGAMA</title>
        <link rel="icon" href="data:image/x-icon;base64,{{ favicon | safe }}" />
        <style>
            a.delete { text-decoration: none; }
            body { display: table-cell; text-align: center }
            div#logo { font-size: 6em }
            form { padding-top: 1em }
            html { display: table; margin: auto }
            input { font-size: large }
            p.footer { border-top: 1px solid #999; margin: 1em 4em 0 4em; padding-top: 1em }
            table { padding: 1em 0 0 3.5em; margin: auto }
            td.actions { padding: 1em; text-align: center }
            td.item { border: 1px solid #ddd }
            td.item a { color: black; display: block; font-size: larger; padding: 1em; text-decoration: none }
            tr.item-0 td.item { background-color: #edd }
            tr.item-1 td.item { background-color: #ded }
        </style>
    </head>
    <body>
        <div id="logo">🦎</div>
        <h1>AGAMA</h1>
        <h3>A (very) Generic App to Manage Anything</h3>
        <form action="items/add" method="POST">
            New item:
            <input type="text" name="new_item" autofocus />
            <input type="submit" value="Add" />
        </form>
        <table>
{% for item in items %}
            <tr class="item-{{ item.state }}">
                <td class="item"><a href="/items/{{ item.id }}/swap-state">{{ item.value }}</a></td>
                <td class="actions"><a class="delete" href="/items/{{ item.id }}/delete">❌</a></td>
            </tr>
{% endfor %}
        </table>
        <p>Hint: Click on item to change its state, or X to delete.</p>
        <p class="footer">
            AGAMA v{{ version }} running on {{ host }} |
            <a href="https://github.com/hudolejev/agama">GitHub</a>
        </p>
    </body>
</html>
"#;

const ERROR_TEMPLATE: &str = r#"<h2>Error</h2>{% for line in lines %}<p>{{ line }}</p>{% endfor %}<p><a href="/">Go back</a>.</p>"#;

/// Renders the item list page and error pages.
pub struct Renderer {
    tera: Tera,
    host: String,
}

impl Renderer {
    /// Compile the templates. `host` is shown in the page footer.
    pub fn new(host: impl Into<String>) -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("index.html", INDEX_TEMPLATE),
            ("error.html", ERROR_TEMPLATE),
        ])?;

        Ok(Self {
            tera,
            host: host.into(),
        })
    }

    /// Compile the templates, naming this machine in the footer.
    pub fn for_local_host() -> tera::Result<Self> {
        Self::new(local_hostname())
    }

    /// Render the full list view.
    pub fn render(&self, items: &[Item]) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("items", items);
        context.insert("host", &self.host);
        context.insert("version", crate::VERSION);
        context.insert("favicon", FAVICON_BASE64);
        self.tera.render("index.html", &context)
    }

    /// Render an error view. Each line of the message becomes a paragraph.
    pub fn render_error(&self, message: &str) -> tera::Result<String> {
        let lines: Vec<&str> = message.trim().split('\n').collect();

        let mut context = Context::new();
        context.insert("lines", &lines);
        self.tera.render("error.html", &context)
    }
}

/// This machine's host name, or `localhost` if it cannot be read.
pub fn local_hostname() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}
