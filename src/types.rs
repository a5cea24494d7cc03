use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::FetchError;
use crate::query::ListQuery;

/// Off-chain datatype definition (`/datatypes`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datatype {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub validator: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxRef {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Older nodes send a single `topic`, newer ones a `topics` list
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub tx: TxRef,
    #[serde(default)]
    pub datahash: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
}

impl MessageHeader {
    /// First topic, whichever wire form was used
    pub fn topic(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .or_else(|| self.topics.first().map(String::as_str))
    }

    /// Tag if present, otherwise the legacy `context` field
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref().or(self.tag.as_deref())
    }

    pub fn is_pinned(&self) -> bool {
        self.tx.kind.as_deref() == Some("pin")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Broadcast or private message (`/messages`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub header: MessageHeader,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub confirmed: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataRef>,
}

/// One backend entity, tagged by the resource it came from
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Message(Message),
    Datatype(Datatype),
}

impl Record {
    /// Unique id used as the row key
    pub fn key(&self) -> &str {
        match self {
            Record::Message(m) => &m.header.id,
            Record::Datatype(d) => &d.id,
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Record::Message(_) => Resource::Messages,
            Record::Datatype(_) => Resource::Datatypes,
        }
    }

    /// Full record as JSON, for the detail overlay and copy
    pub fn to_json(&self) -> Value {
        let v = match self {
            Record::Message(m) => serde_json::to_value(m),
            Record::Datatype(d) => serde_json::to_value(d),
        };
        v.unwrap_or(Value::Null)
    }
}

/// Backend entity collection under a namespace
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Messages,
    Datatypes,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::Messages, Resource::Datatypes];

    /// URL path segment under `/namespaces/<ns>/`
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Messages => "messages",
            Resource::Datatypes => "datatypes",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Resource::Messages => "Messages",
            Resource::Datatypes => "Datatypes",
        }
    }

    pub fn empty_text(&self) -> &'static str {
        match self {
            Resource::Messages => "No messages to display",
            Resource::Datatypes => "No datatypes to display",
        }
    }

    pub fn next(&self) -> Resource {
        let idx = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Decode one item of this resource from its JSON form
    pub fn decode(&self, v: Value) -> Result<Record, serde_json::Error> {
        Ok(match self {
            Resource::Messages => Record::Message(serde_json::from_value(v)?),
            Resource::Datatypes => Record::Datatype(serde_json::from_value(v)?),
        })
    }
}

impl std::str::FromStr for Resource {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "messages" | "message" | "msgs" => Ok(Resource::Messages),
            "datatypes" | "datatype" | "dt" => Ok(Resource::Datatypes),
            _ => Err(anyhow::anyhow!(
                "Invalid resource '{s}'. Valid options: messages, datatypes"
            )),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// One page of a remote list, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Count of all matching items server-side
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new(), total: 0 }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    PageLoaded {
        seq: u64,
        query: ListQuery,
        result: Result<Page<Record>, FetchError>,
    },
    Quit,
}
