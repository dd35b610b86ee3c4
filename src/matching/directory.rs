/// 地点目录
///
/// 目录是静态输入数据，启动时加载一次，运行期间只读。
/// 房间号条目的生成也在这里完成，与打分逻辑无关。

use crate::error::NavError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// 房间号中 `.` 后的前导零，`04.2.010` 与 `04.2.10` 视为同一房间
static ROOM_LEADING_ZEROS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.0+").expect("room pattern is valid"));

/// 地点类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Person,
    Room,
    Facility,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LocationKind::Person => "person",
            LocationKind::Room => "room",
            LocationKind::Facility => "facility",
        };
        write!(f, "{}", text)
    }
}

/// 门牌颜色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignColor {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

/// 门牌的视觉与触觉提示
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSignage {
    /// 门牌上的文字或符号
    pub visual_sign: String,
    /// 触觉描述
    pub tactile_sign: String,
    pub sign_color: SignColor,
}

/// 目录中的一个地点
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    /// 规范显示名称
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    /// 权威房间号
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// 其他说法，可能与其他地点重复
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signage: Option<RoomSignage>,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LocationKind) -> Self {
        Location {
            id: id.into(),
            name: name.into(),
            kind,
            room: None,
            aliases: Vec::new(),
            signage: None,
        }
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_signage(mut self, signage: RoomSignage) -> Self {
        self.signage = Some(signage);
        self
    }

    /// 交给路线规划的目的地标识：有房间号时用房间号，否则用小写名称
    pub fn destination_key(&self) -> String {
        match self.room.as_deref() {
            Some(room) if !room.is_empty() => room.to_string(),
            _ => self.name.to_lowercase(),
        }
    }

    /// 名称和所有别名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.room {
            Some(room) => write!(f, "{} (Raum {})", self.name, room),
            None => write!(f, "{} ({})", self.name, self.kind),
        }
    }
}

/// 统一房间号写法
pub fn normalize_room(room: &str) -> String {
    ROOM_LEADING_ZEROS.replace_all(room.trim(), ".").into_owned()
}

/// 生成编号房间：`room-001` / `Raum 1` / `<prefix>.001`，别名为数字本身
pub fn generate_room_numbers(count: usize, prefix: &str) -> Vec<Location> {
    (1..=count)
        .map(|n| {
            let padded = format!("{:03}", n);
            Location::new(format!("room-{}", padded), format!("Raum {}", n), LocationKind::Room)
                .with_room(format!("{}.{}", prefix, padded))
                .with_aliases([n.to_string()])
        })
        .collect()
}

/// 只读地点目录
#[derive(Clone, Debug, Default)]
pub struct LocationDirectory {
    locations: Vec<Location>,
}

impl LocationDirectory {
    pub fn new(locations: Vec<Location>) -> Self {
        LocationDirectory { locations }
    }

    /// 从 JSON 数组解析
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        let locations: Vec<Location> = serde_json::from_str(json)?;
        Ok(Self::new(locations))
    }

    /// 从 JSON 文件加载
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// 追加生成的编号房间
    pub fn with_room_numbers(mut self, count: usize, prefix: &str) -> Self {
        self.locations.extend(generate_room_numbers(count, prefix));
        self
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// 输入框联想：名称或任一别名包含查询串（不区分大小写），保持目录顺序
    pub fn filter_by_prefix(&self, query: &str) -> Vec<&Location> {
        filter_by_prefix(query, &self.locations)
    }

    /// 按房间号查找门牌，返回第一个带门牌信息的地点
    pub fn find_signage_by_room(&self, room: &str) -> Option<&RoomSignage> {
        let wanted = normalize_room(room);
        self.locations
            .iter()
            .filter(|l| l.room.as_deref().map(normalize_room).as_deref() == Some(wanted.as_str()))
            .find_map(|l| l.signage.as_ref())
    }
}

/// 子串过滤；空查询返回空列表
pub fn filter_by_prefix<'a>(query: &str, directory: &'a [Location]) -> Vec<&'a Location> {
    if query.is_empty() {
        return Vec::new();
    }
    let query = query.to_lowercase();
    directory
        .iter()
        .filter(|location| location.names().any(|name| name.to_lowercase().contains(&query)))
        .collect()
}
