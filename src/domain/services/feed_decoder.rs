// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::feed_entry::{DecodedFeedEntry, DeletionNotice, FeedNotification};
use chrono::{DateTime, FixedOffset};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// 观看页基础地址
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch";

/// 解码错误
///
/// 按字段区分，便于运维区分上游数据问题与管道缺陷。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8")]
    InvalidEncoding,
    #[error("malformed XML: {0}")]
    Malformed(String),
    #[error("feed contains no entry")]
    NoEntry,
    #[error("entry is missing videoId")]
    MissingVideoId,
    #[error("entry is missing channelId")]
    MissingChannelId,
    #[error("entry is missing title")]
    MissingTitle,
    #[error("entry is missing {0}")]
    MissingTimestamp(&'static str),
    #[error("entry has invalid {field} timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

impl DecodeError {
    /// 出错的字段名（如有）
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DecodeError::MissingVideoId => Some("videoId"),
            DecodeError::MissingChannelId => Some("channelId"),
            DecodeError::MissingTitle => Some("title"),
            DecodeError::MissingTimestamp(field) => Some(field),
            DecodeError::InvalidTimestamp { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// 生成规范观看地址
pub fn watch_url(video_id: &str) -> String {
    match url::Url::parse_with_params(WATCH_URL_BASE, &[("v", video_id)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?v={}", WATCH_URL_BASE, video_id),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    VideoId,
    ChannelId,
    Title,
    Published,
    Updated,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"videoId" => Some(Field::VideoId),
            b"channelId" => Some(Field::ChannelId),
            b"title" => Some(Field::Title),
            b"published" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct RawEntry {
    video_id: Option<String>,
    channel_id: Option<String>,
    title: Option<String>,
    link: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

impl RawEntry {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::VideoId => &mut self.video_id,
            Field::ChannelId => &mut self.channel_id,
            Field::Title => &mut self.title,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn into_entry(self) -> Result<DecodedFeedEntry, DecodeError> {
        let video_id = non_empty(self.video_id).ok_or(DecodeError::MissingVideoId)?;
        let channel_id = non_empty(self.channel_id).ok_or(DecodeError::MissingChannelId)?;
        let title = non_empty(self.title).ok_or(DecodeError::MissingTitle)?;
        let published_at = parse_timestamp("published", self.published)?;
        let updated_at = parse_timestamp("updated", self.updated)?;
        let url = non_empty(self.link).unwrap_or_else(|| watch_url(&video_id));

        Ok(DecodedFeedEntry {
            video_id,
            channel_id,
            title,
            url,
            published_at,
            updated_at,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_timestamp(
    field: &'static str,
    value: Option<String>,
) -> Result<DateTime<FixedOffset>, DecodeError> {
    let value = non_empty(value).ok_or(DecodeError::MissingTimestamp(field))?;
    DateTime::parse_from_rfc3339(&value)
        .map_err(|_| DecodeError::InvalidTimestamp { field, value })
}

/// hub 推送内容解码器
///
/// 把 Atom 载荷转换为 [`FeedNotification`]。解码只做结构转换：字段内的空白原样保留。
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedDecoder;

impl FeedDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode_bytes(&self, body: &[u8]) -> Result<FeedNotification, DecodeError> {
        let xml = std::str::from_utf8(body).map_err(|_| DecodeError::InvalidEncoding)?;
        self.decode(xml)
    }

    pub fn decode(&self, xml: &str) -> Result<FeedNotification, DecodeError> {
        let mut reader = Reader::from_str(xml);

        let mut depth: usize = 0;
        let mut entry_depth: Option<usize> = None;
        let mut entry = RawEntry::default();
        let mut entry_seen = false;
        let mut capture: Option<Field> = None;
        let mut text = String::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?;

            match event {
                Event::Start(e) => {
                    let name = e.local_name();
                    let name = name.as_ref();

                    if name == b"deleted-entry" {
                        return Ok(FeedNotification::Deleted(deletion_notice(&e)?));
                    }

                    match entry_depth {
                        None if name == b"entry" && !entry_seen => {
                            entry_depth = Some(depth);
                            entry_seen = true;
                        }
                        Some(d) if depth == d + 1 => {
                            if name == b"link" {
                                take_link(&e, &mut entry)?;
                            } else if let Some(field) = Field::from_local_name(name) {
                                capture = Some(field);
                                text.clear();
                            }
                        }
                        _ => {}
                    }

                    depth += 1;
                }
                Event::Empty(e) => {
                    let name = e.local_name();
                    let name = name.as_ref();

                    if name == b"deleted-entry" {
                        return Ok(FeedNotification::Deleted(deletion_notice(&e)?));
                    }

                    if let Some(d) = entry_depth {
                        if depth == d + 1 {
                            if name == b"link" {
                                take_link(&e, &mut entry)?;
                            } else if let Some(field) = Field::from_local_name(name) {
                                entry.set(field, String::new());
                            }
                        }
                    }
                }
                Event::Text(t) => {
                    if capture.is_some() {
                        let value = t
                            .unescape()
                            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
                        text.push_str(&value);
                    }
                }
                Event::CData(c) => {
                    if capture.is_some() {
                        let bytes = c.into_inner();
                        let value = std::str::from_utf8(&bytes)
                            .map_err(|_| DecodeError::InvalidEncoding)?;
                        text.push_str(value);
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);

                    match entry_depth {
                        Some(d) if depth == d + 1 => {
                            if let Some(field) = capture.take() {
                                entry.set(field, std::mem::take(&mut text));
                            }
                        }
                        // First entry closed; YouTube sends one entry per notification
                        Some(d) if depth == d => break,
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !entry_seen {
            return Err(DecodeError::NoEntry);
        }

        entry.into_entry().map(FeedNotification::Entry)
    }
}

fn take_link(e: &BytesStart<'_>, entry: &mut RawEntry) -> Result<(), DecodeError> {
    let mut href = None;
    let mut rel = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| DecodeError::Malformed(err.to_string()))?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel = Some(value),
            _ => {}
        }
    }

    let is_alternate = rel.as_deref().map_or(true, |r| r == "alternate");
    if is_alternate && entry.link.is_none() {
        entry.link = href;
    }
    Ok(())
}

fn deletion_notice(e: &BytesStart<'_>) -> Result<DeletionNotice, DecodeError> {
    let mut notice = DeletionNotice::default();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| DecodeError::Malformed(err.to_string()))?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"ref" => notice.entry_ref = Some(value),
            b"when" => notice.deleted_at = Some(value),
            _ => {}
        }
    }

    Ok(notice)
}

#[cfg(test)]
#[path = "feed_decoder_test.rs"]
mod tests;
