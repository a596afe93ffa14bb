use std::io::Cursor;

use chrono::{TimeZone, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::blog::PostMetadata;
use crate::text_utils::parse_date_time;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>Jane Doe - Blog</title>
  <link>https://janedoe.example</link>
  <description>Notes on photography and code</description>
  <item>
    <title>Shooting in fog</title>
    <link>https://janedoe.example/blog/shooting-in-fog</link>
    <guid isPermaLink="true">https://janedoe.example/blog/shooting-in-fog</guid>
    <description><![CDATA[Notes from a foggy morning.]]></description>
    <pubDate>Tue, 5 Mar 2024 00:00:00 +0000</pubDate>
  </item>
</channel>
</rss>
*/

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
}

impl<'a> RssChannel<'a> {
    pub fn render(&self, posts: &[PostMetadata]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for post in posts {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", post.title.as_str())?;

            let link = full_link(self.ch_link, &post.slug);
            push_text(&mut writer, "link", link.as_str())?;

            let mut guid_elem = BytesStart::new("guid");
            guid_elem.push_attribute(("isPermaLink", "true"));
            writer.write_event(Event::Start(guid_elem))?;
            writer.write_event(Event::Text(BytesText::new(link.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            push_cdata(&mut writer, "description", post.excerpt.as_str())?;

            for tag in post.tags.iter() {
                push_text(&mut writer, "category", tag.as_str())?;
            }

            // Posts with an unparseable date simply have no pubDate
            if let Some(dt) = parse_date_time(&post.date) {
                let dt = Utc.from_utc_datetime(&dt);
                push_text(&mut writer, "pubDate", &dt.to_rfc2822())?;
            }

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn full_link(base_url: &str, slug: &str) -> String {
    format!("{}/blog/{}", base_url.trim_end_matches('/'), slug)
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if text.contains("]]>") {
        let new_text = text.replace("]]>", "]] >");
        writer.write_event(Event::CData(BytesCData::new(&new_text)))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
