pub const CONFIG_DATA: &str = r#"
[site]
title = "Jane Doe"
base_url = "https://janedoe.example"
description = "Photos and notes"
owner = "Jane Doe"

[[site.social]]
name = "GitHub"
url = "https://github.com/janedoe"

[[site.social]]
name = "Instagram"
url = "https://instagram.com/janedoe"

[paths]
template_dir = "res/template"
public_dir = "public"
blog_dir = "content/blog"
pages_dir = "content/pages"
photo_metadata = "content/photos/metadata.json"
output_dir = "out"

[defaults]
page_size = 6

[server]
address = "127.0.0.1"
port = 8001

[images]
originals_dir = "public/photos/original"
web_dir = "public/photos/web"

[contact]
form_action = "https://forms.example/f/abc123"
redirect_url = "https://janedoe.example/contact?success=true"
email = "jane@janedoe.example"

[feed]
title = "Jane Doe - Blog"
description = "Notes on photography and code"
size = 20
"#;

pub const PHOTO_METADATA: &str = r#"{
  "harbor.jpg": {
    "title": "Harbor Lights",
    "description": "Boats at dusk.",
    "tags": ["sea", "city"],
    "metadata": {"camera": "X100V", "aperture": "f/2.0", "date": "2023-08-01"},
    "dimensions": {"width": 1200, "height": 800}
  },
  "landscape/fog.jpg": {
    "title": "Morning Fog",
    "description": "Valley before sunrise.",
    "tags": ["nature"],
    "metadata": {"camera": "Unknown"},
    "dimensions": {"width": 800, "height": 1200}
  },
  "market.jpg": {
    "title": "Market",
    "description": "",
    "tags": ["street", "city"],
    "metadata": {}
  },
  "dunes.png": {
    "title": "Dunes",
    "description": "Wind *shapes* sand.",
    "tags": ["nature", "sea"],
    "metadata": {"location": "Namib"},
    "dimensions": {"width": 1200, "height": 900}
  }
}"#;

pub const POST_DATA: &str = r#"---
title: Shooting in fog
date: "2024-03-05"
tags: [photography, travel]
excerpt: Notes from a foggy morning.
image: /public/fog.jpg
author:
  name: Jane Doe
  avatar: /public/jane.jpg
  bio: Photographer
---
## Gear

Only one lens.

:::collapsible[Settings]{open}
- f/8
- 1/250
:::

## Gear
"#;
