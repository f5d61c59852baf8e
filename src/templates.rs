//! Parameterized story templates, one tagged union per difficulty tier.
//!
//! Each variant carries a strongly-typed parameter record. Samplers pick the
//! solution first and build every dependent quantity from it, so the
//! canonical equation always has an exact integer solution. Renderers are
//! pure functions of the record.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::Serialize;

use crate::domain::Difficulty;
use crate::seeds::{CITIES, COLLECTIBLES, LOCATIONS, NAMES, SHOP_ITEMS, WORK_ITEMS};

/// Text produced by a template, ready to become a `MathProblem`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
  pub story: String,
  pub question: String,
  pub unknown_definition: String,
  pub equation: String,
  pub hint: String,
}

/// Template identities, listed per tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
  UnitPrice,
  Collection,
  Change,
  Travel,
  FeeShopping,
  Taxi,
  Plant,
  Membership,
  CatchUp,
  Meeting,
  Cooperation,
  SavingsPlans,
}

const EASY: &[TemplateKind] =
  &[TemplateKind::UnitPrice, TemplateKind::Collection, TemplateKind::Change, TemplateKind::Travel];
const MEDIUM: &[TemplateKind] =
  &[TemplateKind::FeeShopping, TemplateKind::Taxi, TemplateKind::Plant, TemplateKind::Membership];
const HARD: &[TemplateKind] =
  &[TemplateKind::CatchUp, TemplateKind::Meeting, TemplateKind::Cooperation, TemplateKind::SavingsPlans];

impl TemplateKind {
  /// Candidate templates for a tier. Never empty.
  pub fn for_difficulty(difficulty: Difficulty) -> &'static [TemplateKind] {
    match difficulty {
      Difficulty::Easy => EASY,
      Difficulty::Medium => MEDIUM,
      Difficulty::Hard => HARD,
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      TemplateKind::UnitPrice => "unit_price",
      TemplateKind::Collection => "collection",
      TemplateKind::Change => "change",
      TemplateKind::Travel => "travel",
      TemplateKind::FeeShopping => "fee_shopping",
      TemplateKind::Taxi => "taxi",
      TemplateKind::Plant => "plant",
      TemplateKind::Membership => "membership",
      TemplateKind::CatchUp => "catch_up",
      TemplateKind::Meeting => "meeting",
      TemplateKind::Cooperation => "cooperation",
      TemplateKind::SavingsPlans => "savings_plans",
    }
  }

  pub fn sample(&self, rng: &mut dyn RngCore) -> Template {
    match self {
      TemplateKind::UnitPrice => Template::Easy(EasyTemplate::UnitPrice(UnitPrice::sample(rng))),
      TemplateKind::Collection => Template::Easy(EasyTemplate::Collection(Collection::sample(rng))),
      TemplateKind::Change => Template::Easy(EasyTemplate::Change(Change::sample(rng))),
      TemplateKind::Travel => Template::Easy(EasyTemplate::Travel(Travel::sample(rng))),
      TemplateKind::FeeShopping => Template::Medium(MediumTemplate::FeeShopping(FeeShopping::sample(rng))),
      TemplateKind::Taxi => Template::Medium(MediumTemplate::Taxi(BaseRate::sample(rng))),
      TemplateKind::Plant => Template::Medium(MediumTemplate::Plant(BaseRate::sample(rng))),
      TemplateKind::Membership => Template::Medium(MediumTemplate::Membership(BaseRate::sample_tens(rng))),
      TemplateKind::CatchUp => Template::Hard(HardTemplate::CatchUp(CatchUp::sample(rng))),
      TemplateKind::Meeting => Template::Hard(HardTemplate::Meeting(Meeting::sample(rng))),
      TemplateKind::Cooperation => Template::Hard(HardTemplate::Cooperation(Cooperation::sample(rng))),
      TemplateKind::SavingsPlans => Template::Hard(HardTemplate::SavingsPlans(SavingsPlans::sample(rng))),
    }
  }
}

/// A sampled template: tier, identity and parameters.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Template {
  Easy(EasyTemplate),
  Medium(MediumTemplate),
  Hard(HardTemplate),
}

impl Template {
  /// Pick a template uniformly from the tier's list and sample it.
  pub fn sample(difficulty: Difficulty, rng: &mut dyn RngCore) -> Template {
    let kinds = TemplateKind::for_difficulty(difficulty);
    let kind = kinds[rng.gen_range(0..kinds.len())];
    kind.sample(rng)
  }

  pub fn difficulty(&self) -> Difficulty {
    match self {
      Template::Easy(_) => Difficulty::Easy,
      Template::Medium(_) => Difficulty::Medium,
      Template::Hard(_) => Difficulty::Hard,
    }
  }

  pub fn kind(&self) -> TemplateKind {
    match self {
      Template::Easy(t) => match t {
        EasyTemplate::UnitPrice(_) => TemplateKind::UnitPrice,
        EasyTemplate::Collection(_) => TemplateKind::Collection,
        EasyTemplate::Change(_) => TemplateKind::Change,
        EasyTemplate::Travel(_) => TemplateKind::Travel,
      },
      Template::Medium(t) => match t {
        MediumTemplate::FeeShopping(_) => TemplateKind::FeeShopping,
        MediumTemplate::Taxi(_) => TemplateKind::Taxi,
        MediumTemplate::Plant(_) => TemplateKind::Plant,
        MediumTemplate::Membership(_) => TemplateKind::Membership,
      },
      Template::Hard(t) => match t {
        HardTemplate::CatchUp(_) => TemplateKind::CatchUp,
        HardTemplate::Meeting(_) => TemplateKind::Meeting,
        HardTemplate::Cooperation(_) => TemplateKind::Cooperation,
        HardTemplate::SavingsPlans(_) => TemplateKind::SavingsPlans,
      },
    }
  }

  /// Dedup key: `<DIFFICULTY>:<variant JSON>`. The variant JSON names the
  /// template and lists every parameter, so equal draws always collide.
  pub fn signature(&self) -> String {
    let params = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
    format!("{}:{}", self.difficulty(), params)
  }

  pub fn answer(&self) -> i64 {
    match self {
      Template::Easy(t) => t.answer(),
      Template::Medium(t) => t.answer(),
      Template::Hard(t) => t.answer(),
    }
  }

  pub fn render(&self) -> Rendered {
    match self {
      Template::Easy(t) => t.render(),
      Template::Medium(t) => t.render(),
      Template::Hard(t) => t.render(),
    }
  }
}

// -------- sampling helpers --------

fn pick<T: Copy>(rng: &mut dyn RngCore, pool: &[T]) -> T {
  pool[rng.gen_range(0..pool.len())]
}

/// Two distinct entries of `pool` (which holds at least two).
fn pick_two(rng: &mut dyn RngCore, pool: &'static [&'static str]) -> (&'static str, &'static str) {
  let mut it = pool.choose_multiple(rng, 2).copied();
  match (it.next(), it.next()) {
    (Some(a), Some(b)) => (a, b),
    _ => (pool[0], pool[pool.len() - 1]),
  }
}

fn between(rng: &mut dyn RngCore, lo: i64, hi: i64) -> i64 {
  rng.gen_range(lo..=hi)
}

// -------- EASY: one arithmetic step --------

#[derive(Clone, Debug, Serialize, PartialEq)]
pub enum EasyTemplate {
  UnitPrice(UnitPrice),
  Collection(Collection),
  Change(Change),
  Travel(Travel),
}

/// `count · x = total`, x is the unit price.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UnitPrice {
  pub person: &'static str,
  pub location: &'static str,
  pub item: &'static str,
  pub unit: &'static str,
  pub count: i64,
  pub price: i64,
}

impl UnitPrice {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let item = pick(rng, SHOP_ITEMS);
    Self {
      person: pick(rng, NAMES),
      location: pick(rng, LOCATIONS),
      item: item.name,
      unit: item.unit,
      count: between(rng, 3, 9),
      price: between(rng, item.price.0, item.price.1),
    }
  }
}

/// `current + x = total`, x is how many were added today.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Collection {
  pub person: &'static str,
  pub item: &'static str,
  pub unit: &'static str,
  pub verb: &'static str,
  pub current: i64,
  pub gained: i64,
}

impl Collection {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let c = pick(rng, COLLECTIBLES);
    Self {
      person: pick(rng, NAMES),
      item: c.name,
      unit: c.unit,
      verb: c.verb,
      current: between(rng, 10, 40),
      gained: between(rng, 5, 20),
    }
  }
}

/// `brought - x = left`, x is the amount spent.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Change {
  pub person: &'static str,
  pub location: &'static str,
  pub spent: i64,
  pub left: i64,
}

impl Change {
  fn sample(rng: &mut dyn RngCore) -> Self {
    Self {
      person: pick(rng, NAMES),
      location: pick(rng, LOCATIONS),
      spent: between(rng, 10, 60),
      left: between(rng, 10, 40),
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
  Bike,
  Run,
}

impl TravelMode {
  fn verb(&self) -> &'static str {
    match self {
      TravelMode::Bike => "骑自行车",
      TravelMode::Run => "跑步",
    }
  }
}

/// `speed · x = distance`, x is hours travelled.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Travel {
  pub person: &'static str,
  pub mode: TravelMode,
  pub speed: i64,
  pub hours: i64,
}

impl Travel {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let mode = if rng.gen_bool(0.5) { TravelMode::Bike } else { TravelMode::Run };
    let speed = match mode {
      TravelMode::Bike => between(rng, 12, 20),
      TravelMode::Run => between(rng, 5, 10),
    };
    Self { person: pick(rng, NAMES), mode, speed, hours: between(rng, 2, 5) }
  }
}

impl EasyTemplate {
  fn answer(&self) -> i64 {
    match self {
      EasyTemplate::UnitPrice(p) => p.price,
      EasyTemplate::Collection(p) => p.gained,
      EasyTemplate::Change(p) => p.spent,
      EasyTemplate::Travel(p) => p.hours,
    }
  }

  fn render(&self) -> Rendered {
    match self {
      EasyTemplate::UnitPrice(p) => {
        let total = p.count * p.price;
        Rendered {
          story: format!("{}去{}买了 {} {}{}，一共花了 {} 元。", p.person, p.location, p.count, p.unit, p.item, total),
          question: format!("{}的单价是多少元？", p.item),
          unknown_definition: format!("设{}的单价为 x 元", p.item),
          equation: format!("{}x = {}", p.count, total),
          hint: "数量 × 单价 = 总金额".into(),
        }
      }
      EasyTemplate::Collection(p) => {
        let total = p.current + p.gained;
        Rendered {
          story: format!(
            "{}原本有 {} {}{}。今天{}又{}了一些，现在总共有 {} {}。",
            p.person, p.current, p.unit, p.item, p.person, p.verb, total, p.unit
          ),
          question: format!("今天{}了多少{}{}？", p.verb, p.unit, p.item),
          unknown_definition: format!("设今天{}了 x {}", p.verb, p.unit),
          equation: format!("{} + x = {}", p.current, total),
          hint: "原有的 + 新增的 = 总数".into(),
        }
      }
      EasyTemplate::Change(p) => {
        let brought = p.spent + p.left;
        Rendered {
          story: format!("{}带了 {} 元去{}。买完东西后，钱包里还剩 {} 元。", p.person, brought, p.location, p.left),
          question: format!("{}买东西花了多少钱？", p.person),
          unknown_definition: "设花了 x 元".into(),
          equation: format!("{} - x = {}", brought, p.left),
          hint: "带去的钱 - 花掉的钱 = 剩下的钱".into(),
        }
      }
      EasyTemplate::Travel(p) => {
        let distance = p.speed * p.hours;
        let verb = p.mode.verb();
        Rendered {
          story: format!(
            "{}周末去公园{}锻炼。{}的速度是每小时 {} 千米，一共跑了 {} 千米。",
            p.person, verb, p.person, p.speed, distance
          ),
          question: format!("{}{}用了多少小时？", p.person, verb),
          unknown_definition: "设用了 x 小时".into(),
          equation: format!("{}x = {}", p.speed, distance),
          hint: "速度 × 时间 = 路程".into(),
        }
      }
    }
  }
}

// -------- MEDIUM: base + rate --------

#[derive(Clone, Debug, Serialize, PartialEq)]
pub enum MediumTemplate {
  FeeShopping(FeeShopping),
  Taxi(BaseRate),
  Plant(BaseRate),
  Membership(BaseRate),
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
  Shipping,
  Packaging,
}

impl FeeKind {
  fn label(&self) -> &'static str {
    match self {
      FeeKind::Shipping => "运费",
      FeeKind::Packaging => "包装费",
    }
  }
}

/// `count · x + fee = total`, x is the unit price.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FeeShopping {
  pub person: &'static str,
  pub location: &'static str,
  pub item: &'static str,
  pub unit: &'static str,
  pub count: i64,
  pub price: i64,
  pub fee: i64,
  pub fee_kind: FeeKind,
}

impl FeeShopping {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let item = pick(rng, SHOP_ITEMS);
    Self {
      person: pick(rng, NAMES),
      location: pick(rng, LOCATIONS),
      item: item.name,
      unit: item.unit,
      count: between(rng, 3, 8),
      price: between(rng, item.price.0, item.price.1),
      fee: between(rng, 5, 15),
      fee_kind: if rng.gen_bool(0.5) { FeeKind::Shipping } else { FeeKind::Packaging },
    }
  }
}

/// `base + rate · x = total`, shared by the taxi, plant and membership stories.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BaseRate {
  pub person: &'static str,
  pub base: i64,
  pub rate: i64,
  pub steps: i64,
}

impl BaseRate {
  fn sample(rng: &mut dyn RngCore) -> Self {
    Self {
      person: pick(rng, NAMES),
      base: between(rng, 5, 20),
      rate: between(rng, 2, 8),
      steps: between(rng, 3, 12),
    }
  }

  /// Money amounts in tens of yuan, for membership fees.
  fn sample_tens(rng: &mut dyn RngCore) -> Self {
    let mut p = Self::sample(rng);
    p.base *= 10;
    p.rate *= 10;
    p
  }

  fn total(&self) -> i64 {
    self.base + self.rate * self.steps
  }

  fn equation(&self) -> String {
    format!("{} + {}x = {}", self.base, self.rate, self.total())
  }
}

impl MediumTemplate {
  fn answer(&self) -> i64 {
    match self {
      MediumTemplate::FeeShopping(p) => p.price,
      MediumTemplate::Taxi(p) | MediumTemplate::Plant(p) | MediumTemplate::Membership(p) => p.steps,
    }
  }

  fn render(&self) -> Rendered {
    match self {
      MediumTemplate::FeeShopping(p) => {
        let total = p.count * p.price + p.fee;
        let fee_name = p.fee_kind.label();
        Rendered {
          story: format!(
            "{}在{}订购了 {} {}{}。除了商品本身的钱，还额外支付了 {} 元的{}，一共付款 {} 元。",
            p.person, p.location, p.count, p.unit, p.item, p.fee, fee_name, total
          ),
          question: format!("每{}{}的价格是多少？", p.unit, p.item),
          unknown_definition: "设单价为 x 元".into(),
          equation: format!("{}x + {} = {}", p.count, p.fee, total),
          hint: format!("(数量 × 单价) + {} = 总金额", fee_name),
        }
      }
      MediumTemplate::Taxi(p) => Rendered {
        story: format!(
          "{}坐出租车回家，起步价是 {} 元，之后每行驶1公里收费 {} 元。到达目的地时，一共付了 {} 元。",
          p.person, p.base, p.rate, p.total()
        ),
        question: "按这样计费，出租车行驶了多少公里？".into(),
        unknown_definition: "设行驶了 x 公里".into(),
        equation: p.equation(),
        hint: "起步价 + (每公里收费 × 公里数) = 总费用".into(),
      },
      MediumTemplate::Plant(p) => Rendered {
        story: format!(
          "{}和同学们种了一棵高 {} 厘米的小树，它生长非常快，平均每天长高 {} 厘米。经过一段时间后，它长到了 {} 厘米。",
          p.person, p.base, p.rate, p.total()
        ),
        question: "小树长了多少天？".into(),
        unknown_definition: "设经过了 x 天".into(),
        equation: p.equation(),
        hint: "原始高度 + (每天长高 × 天数) = 现在的高度".into(),
      },
      MediumTemplate::Membership(p) => Rendered {
        story: format!(
          "{}办了一张健身房会员卡，交了 {} 元入会费，之后每月月费 {} 元。一段时间后累计花费 {} 元。",
          p.person, p.base, p.rate, p.total()
        ),
        question: "办了几个月的会员？".into(),
        unknown_definition: "设办了 x 个月".into(),
        equation: p.equation(),
        hint: "入会费 + (月费 × 月数) = 总费用".into(),
      },
    }
  }
}

// -------- HARD: two-sided, combined rates, plan comparison --------

#[derive(Clone, Debug, Serialize, PartialEq)]
pub enum HardTemplate {
  CatchUp(CatchUp),
  Meeting(Meeting),
  Cooperation(Cooperation),
  SavingsPlans(SavingsPlans),
}

/// `fast · x - slow · x = gap`, x is hours until the car catches the truck.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CatchUp {
  pub slow: i64,
  pub speed_gap: i64,
  pub hours: i64,
}

impl CatchUp {
  fn sample(rng: &mut dyn RngCore) -> Self {
    Self { slow: between(rng, 40, 60), speed_gap: between(rng, 10, 30), hours: between(rng, 2, 6) }
  }
}

/// `(v1 + v2) · x = distance`, x is hours until two cars meet.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Meeting {
  pub from: &'static str,
  pub to: &'static str,
  pub speed_a: i64,
  pub speed_b: i64,
  pub hours: i64,
}

impl Meeting {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let (from, to) = pick_two(rng, CITIES);
    Self { from, to, speed_a: between(rng, 60, 90), speed_b: between(rng, 60, 90), hours: between(rng, 3, 8) }
  }
}

/// `(r1 + r2) · x = work`, x is days working together.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Cooperation {
  pub first: &'static str,
  pub second: &'static str,
  pub item: &'static str,
  pub unit: &'static str,
  pub verb: &'static str,
  pub rate_a: i64,
  pub rate_b: i64,
  pub days: i64,
}

impl Cooperation {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let (first, second) = pick_two(rng, NAMES);
    let w = pick(rng, WORK_ITEMS);
    Self {
      first,
      second,
      item: w.name,
      unit: w.unit,
      verb: w.verb,
      rate_a: between(rng, 10, 25),
      rate_b: between(rng, 12, 28),
      days: between(rng, 4, 10),
    }
  }
}

/// `a + b · x = c + d · x` with `b > d`, x is months until both savings match.
/// `first` starts with more (`c`) and saves less (`d`).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SavingsPlans {
  pub first: &'static str,
  pub second: &'static str,
  pub start_low: i64,
  pub fast_rate: i64,
  pub slow_rate: i64,
  pub months: i64,
}

impl SavingsPlans {
  fn sample(rng: &mut dyn RngCore) -> Self {
    let (first, second) = pick_two(rng, NAMES);
    let fast_rate = between(rng, 10, 20);
    Self {
      first,
      second,
      start_low: between(rng, 50, 200),
      fast_rate,
      slow_rate: between(rng, 5, fast_rate - 2),
      months: between(rng, 5, 15),
    }
  }

  fn start_high(&self) -> i64 {
    self.start_low + (self.fast_rate - self.slow_rate) * self.months
  }
}

impl HardTemplate {
  fn answer(&self) -> i64 {
    match self {
      HardTemplate::CatchUp(p) => p.hours,
      HardTemplate::Meeting(p) => p.hours,
      HardTemplate::Cooperation(p) => p.days,
      HardTemplate::SavingsPlans(p) => p.months,
    }
  }

  fn render(&self) -> Rendered {
    match self {
      HardTemplate::CatchUp(p) => {
        let fast = p.slow + p.speed_gap;
        let head_start = p.speed_gap * p.hours;
        Rendered {
          story: format!(
            "一辆货车和一辆轿车同时从两地出发，同向而行。货车在前，每小时行 {} 千米；轿车在后，每小时行 {} 千米。两车原本相距 {} 千米。",
            p.slow, fast, head_start
          ),
          question: "轿车出发后多少小时能追上货车？".into(),
          unknown_definition: "设轿车出发 x 小时后追上".into(),
          equation: format!("{}x - {}x = {}", fast, p.slow, head_start),
          hint: "(快车速度 × 时间) - (慢车速度 × 时间) = 初始距离".into(),
        }
      }
      HardTemplate::Meeting(p) => {
        let distance = (p.speed_a + p.speed_b) * p.hours;
        Rendered {
          story: format!(
            "甲乙两车分别从{}和{}两地同时出发，相向而行。甲车每小时行 {} 千米，乙车每小时行 {} 千米。两地相距 {} 千米。",
            p.from, p.to, p.speed_a, p.speed_b, distance
          ),
          question: "经过多少小时两车相遇？".into(),
          unknown_definition: "设经过 x 小时相遇".into(),
          equation: format!("({} + {})x = {}", p.speed_a, p.speed_b, distance),
          hint: "(甲车速度 + 乙车速度) × 时间 = 总路程".into(),
        }
      }
      HardTemplate::Cooperation(p) => {
        let total = (p.rate_a + p.rate_b) * p.days;
        Rendered {
          story: format!(
            "{}和{}合作{}一批{}。{}每天能{} {} {}，{}每天能{} {} {}。这批任务一共有 {} {}。",
            p.first, p.second, p.verb, p.item, p.first, p.verb, p.rate_a, p.unit, p.second, p.verb, p.rate_b, p.unit,
            total, p.unit
          ),
          question: "两人合作需要多少天完成？".into(),
          unknown_definition: "设需要 x 天".into(),
          equation: format!("({} + {})x = {}", p.rate_a, p.rate_b, total),
          hint: "(甲的效率 + 乙的效率) × 时间 = 总工作量".into(),
        }
      }
      HardTemplate::SavingsPlans(p) => Rendered {
        story: format!(
          "{}有存款 {} 元，以后每月存 {} 元。{}有存款 {} 元，以后每月存 {} 元。",
          p.first,
          p.start_high(),
          p.slow_rate,
          p.second,
          p.start_low,
          p.fast_rate
        ),
        question: "几个月后，两人的存款总额一样多？".into(),
        unknown_definition: "设 x 个月后两人存款一样多".into(),
        equation: format!("{} + {}x = {} + {}x", p.start_low, p.fast_rate, p.start_high(), p.slow_rate),
        hint: "乙的本金 + (乙的月存 × 月数) = 甲的本金 + (甲的月存 × 月数)".into(),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::check::check_equation;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  const ALL_KINDS: [TemplateKind; 12] = [
    TemplateKind::UnitPrice,
    TemplateKind::Collection,
    TemplateKind::Change,
    TemplateKind::Travel,
    TemplateKind::FeeShopping,
    TemplateKind::Taxi,
    TemplateKind::Plant,
    TemplateKind::Membership,
    TemplateKind::CatchUp,
    TemplateKind::Meeting,
    TemplateKind::Cooperation,
    TemplateKind::SavingsPlans,
  ];

  #[test]
  fn every_template_balances_at_its_answer() {
    let mut rng = StdRng::seed_from_u64(7);
    for kind in ALL_KINDS {
      for _ in 0..1000 {
        let t = kind.sample(&mut rng);
        assert_eq!(t.kind(), kind);
        let r = t.render();
        assert!(
          check_equation(t.answer() as f64, &r.equation).is_ok(),
          "{} does not balance at {}",
          r.equation,
          t.answer()
        );
      }
    }
  }

  #[test]
  fn quantities_are_positive() {
    let mut rng = StdRng::seed_from_u64(11);
    for kind in ALL_KINDS {
      for _ in 0..200 {
        let t = kind.sample(&mut rng);
        assert!(t.answer() > 0, "{:?}", t);
        if let Template::Hard(HardTemplate::SavingsPlans(p)) = &t {
          assert!(p.fast_rate > p.slow_rate);
          assert!(p.first != p.second);
        }
        if let Template::Hard(HardTemplate::Meeting(p)) = &t {
          assert_ne!(p.from, p.to);
        }
        if let Template::Hard(HardTemplate::Cooperation(p)) = &t {
          assert_ne!(p.first, p.second);
        }
      }
    }
  }

  #[test]
  fn tiers_only_sample_their_own_templates() {
    let mut rng = StdRng::seed_from_u64(3);
    for difficulty in Difficulty::ALL {
      for _ in 0..100 {
        let t = Template::sample(difficulty, &mut rng);
        assert_eq!(t.difficulty(), difficulty);
        assert!(TemplateKind::for_difficulty(difficulty).contains(&t.kind()));
      }
    }
  }

  #[test]
  fn signature_is_a_pure_function_of_the_draw() {
    let a = Template::sample(Difficulty::Medium, &mut StdRng::seed_from_u64(42));
    let b = Template::sample(Difficulty::Medium, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
    assert_eq!(a.signature(), b.signature());
    assert!(a.signature().starts_with("MEDIUM:{\""));
  }

  #[test]
  fn signature_names_the_template() {
    let t = Template::Easy(EasyTemplate::Change(Change { person: "小明", location: "书店", spent: 30, left: 20 }));
    assert_eq!(t.signature(), r#"EASY:{"Change":{"person":"小明","location":"书店","spent":30,"left":20}}"#);
    assert_eq!(t.render().equation, "50 - x = 20");
  }

  #[test]
  fn membership_amounts_are_in_tens() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
      if let Template::Medium(MediumTemplate::Membership(p)) = TemplateKind::Membership.sample(&mut rng) {
        assert_eq!(p.base % 10, 0);
        assert_eq!(p.rate % 10, 0);
      } else {
        panic!("membership sampler produced another template");
      }
    }
  }
}
