//! Built-in story material. Templates pick from these banks when they
//! sample a problem, so every generated story reads differently even when
//! the numbers repeat.

#[derive(Clone, Copy, Debug)]
pub struct ShopItem {
  pub name: &'static str,
  pub unit: &'static str,
  /// Inclusive unit price range in yuan.
  pub price: (i64, i64),
}

/// Something a person collects, with the verb used in the story.
#[derive(Clone, Copy, Debug)]
pub struct Collectible {
  pub name: &'static str,
  pub unit: &'static str,
  pub verb: &'static str,
}

/// A unit of work for cooperation stories.
#[derive(Clone, Copy, Debug)]
pub struct WorkItem {
  pub name: &'static str,
  pub unit: &'static str,
  pub verb: &'static str,
}

pub const NAMES: &[&str] = &[
  "小明", "小红", "李华", "张伟", "王叔叔", "刘阿姨", "陈老师",
  "爷爷", "奶奶", "小强", "丽丽", "大壮", "赵经理", "孙悟空",
  "光头强", "喜羊羊", "小刚", "菲菲", "马丁", "罗伯特",
];

pub const LOCATIONS: &[&str] = &[
  "超市", "文具店", "书店", "游乐园", "果园", "学校仓库",
  "菜市场", "网上商城", "工厂", "实验室", "体育馆", "外太空空间站",
];

pub const CITIES: &[&str] = &["北京", "上海", "广州", "深圳", "成都", "杭州", "西安", "武汉"];

pub const SHOP_ITEMS: &[ShopItem] = &[
  ShopItem { name: "笔记本", unit: "本", price: (5, 15) },
  ShopItem { name: "钢笔", unit: "支", price: (8, 25) },
  ShopItem { name: "故事书", unit: "本", price: (12, 35) },
  ShopItem { name: "玩具车", unit: "辆", price: (25, 60) },
  ShopItem { name: "巧克力", unit: "盒", price: (15, 40) },
  ShopItem { name: "篮球", unit: "个", price: (80, 150) },
  ShopItem { name: "苹果", unit: "箱", price: (30, 60) },
  ShopItem { name: "牛奶", unit: "箱", price: (40, 70) },
  ShopItem { name: "薯片", unit: "包", price: (4, 10) },
  ShopItem { name: "画笔", unit: "套", price: (18, 50) },
];

pub const COLLECTIBLES: &[Collectible] = &[
  Collectible { name: "邮票", unit: "张", verb: "收集" },
  Collectible { name: "玻璃珠", unit: "颗", verb: "收集" },
  Collectible { name: "贝壳", unit: "个", verb: "捡到" },
  Collectible { name: "卡片", unit: "张", verb: "收藏" },
  Collectible { name: "贴纸", unit: "张", verb: "购买" },
  Collectible { name: "书签", unit: "枚", verb: "制作" },
];

pub const WORK_ITEMS: &[WorkItem] = &[
  WorkItem { name: "零件", unit: "个", verb: "加工" },
  WorkItem { name: "树苗", unit: "棵", verb: "种植" },
  WorkItem { name: "千纸鹤", unit: "只", verb: "折" },
  WorkItem { name: "快递", unit: "件", verb: "打包" },
  WorkItem { name: "传单", unit: "张", verb: "分发" },
];
