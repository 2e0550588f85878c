//! Book Commands

use uuid::Uuid;

/// 生成书籍命令（字段为未校验的原始输入）
#[derive(Debug, Clone)]
pub struct GenerateBook {
    pub book_type: String,
    pub genre: String,
    pub tone: Option<String>,
    pub chapter_count: u32,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// 删除书籍命令
#[derive(Debug, Clone)]
pub struct DeleteBook {
    pub book_id: Uuid,
}

/// 重新生成单个角色（index 从 0 起）
#[derive(Debug, Clone)]
pub struct RegenerateCharacter {
    pub book_id: Uuid,
    pub index: usize,
}

/// 为角色生成肖像
#[derive(Debug, Clone)]
pub struct GeneratePortrait {
    pub book_id: Uuid,
    pub index: usize,
}
